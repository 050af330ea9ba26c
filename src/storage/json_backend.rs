//! JSON file persistence standing in for the hosted store on a single device.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{memory::StoreSnapshot, DataStore, InMemoryStore};
use crate::core::timeframe::TimeWindow;
use crate::domain::{
    Category, CategoryUpdate, Expense, ExpenseUpdate, NewCategory, NewExpense, NewProfile,
    NewRecurringExpense, ProfileUpdate, RecurringExpense, RecurringExpenseUpdate, UserProfile,
};
use crate::errors::{BudgetError, Result};
use crate::utils::persistence::{load_json_or_default, save_json_atomic};

/// [`InMemoryStore`] that rewrites a JSON snapshot after every mutation.
///
/// Mutations and their writes are serialised, so snapshots land on disk in
/// mutation order. A mutation whose write fails returns the error but stays
/// applied in memory; the next successful write persists it.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    writes: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = load_json_or_default::<StoreSnapshot, BudgetError>(&path)?;
        for warning in snapshot_warnings(&snapshot) {
            tracing::warn!(path = %path.display(), "{warning}");
        }
        tracing::debug!(
            path = %path.display(),
            categories = snapshot.categories.len(),
            expenses = snapshot.expenses.len(),
            "opened json store"
        );
        Ok(Self {
            path,
            inner: InMemoryStore::from_snapshot(snapshot),
            writes: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot().await;
        save_json_atomic(&snapshot, &self.path)
    }
}

#[async_trait]
impl DataStore for JsonFileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.inner.get_profile(user_id).await
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile> {
        let _write = self.writes.lock().await;
        let row = self.inner.insert_profile(profile).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileUpdate) -> Result<UserProfile> {
        let _write = self.writes.lock().await;
        let row = self.inner.update_profile(user_id, changes).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>> {
        self.inner.list_categories(user_id).await
    }

    async fn insert_category(&self, user_id: Uuid, category: NewCategory) -> Result<Category> {
        let _write = self.writes.lock().await;
        let row = self.inner.insert_category(user_id, category).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryUpdate,
    ) -> Result<Category> {
        let _write = self.writes.lock().await;
        let row = self.inner.update_category(user_id, id, changes).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let _write = self.writes.lock().await;
        self.inner.delete_category(user_id, id).await?;
        self.persist().await
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        self.inner.list_expenses(user_id).await
    }

    async fn list_recent_expenses(&self, user_id: Uuid, limit: usize) -> Result<Vec<Expense>> {
        self.inner.list_recent_expenses(user_id, limit).await
    }

    async fn list_expenses_in_range(
        &self,
        user_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<Expense>> {
        self.inner.list_expenses_in_range(user_id, window).await
    }

    async fn insert_expense(&self, user_id: Uuid, expense: NewExpense) -> Result<Expense> {
        let _write = self.writes.lock().await;
        let row = self.inner.insert_expense(user_id, expense).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseUpdate,
    ) -> Result<Expense> {
        let _write = self.writes.lock().await;
        let row = self.inner.update_expense(user_id, id, changes).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let _write = self.writes.lock().await;
        self.inner.delete_expense(user_id, id).await?;
        self.persist().await
    }

    async fn delete_expenses_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        let _write = self.writes.lock().await;
        let removed = self
            .inner
            .delete_expenses_for_category(user_id, category_id)
            .await?;
        self.persist().await?;
        Ok(removed)
    }

    async fn list_recurring(&self, user_id: Uuid) -> Result<Vec<RecurringExpense>> {
        self.inner.list_recurring(user_id).await
    }

    async fn insert_recurring(
        &self,
        user_id: Uuid,
        template: NewRecurringExpense,
    ) -> Result<RecurringExpense> {
        let _write = self.writes.lock().await;
        let row = self.inner.insert_recurring(user_id, template).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn update_recurring(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecurringExpenseUpdate,
    ) -> Result<RecurringExpense> {
        let _write = self.writes.lock().await;
        let row = self.inner.update_recurring(user_id, id, changes).await?;
        self.persist().await?;
        Ok(row)
    }

    async fn delete_recurring(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let _write = self.writes.lock().await;
        self.inner.delete_recurring(user_id, id).await?;
        self.persist().await
    }

    async fn delete_recurring_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        let _write = self.writes.lock().await;
        let removed = self
            .inner
            .delete_recurring_for_category(user_id, category_id)
            .await?;
        self.persist().await?;
        Ok(removed)
    }
}

/// Detects rows that reference categories which no longer exist.
pub fn snapshot_warnings(snapshot: &StoreSnapshot) -> Vec<String> {
    let category_ids: HashSet<_> = snapshot.categories.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();
    for expense in &snapshot.expenses {
        if !category_ids.contains(&expense.category_id) {
            warnings.push(format!(
                "expense {} references missing category {}",
                expense.id, expense.category_id
            ));
        }
    }
    for template in &snapshot.recurring {
        if !category_ids.contains(&template.category_id) {
            warnings.push(format!(
                "recurring expense {} references missing category {}",
                template.id, template.category_id
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewCategory, NewExpense};
    use chrono::NaiveDate;

    fn june(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let user = Uuid::new_v4();

        let store = JsonFileStore::open(&path).expect("open");
        let food = store
            .insert_category(user, NewCategory::new("Food", 200.0))
            .await
            .expect("insert category");
        store
            .insert_expense(
                user,
                NewExpense {
                    amount: 18.5,
                    description: "Lunch".into(),
                    date: june(3),
                    category_id: food.id,
                },
            )
            .await
            .expect("insert expense");
        drop(store);

        let reopened = JsonFileStore::open(&path).expect("reopen");
        let categories = reopened.list_categories(user).await.expect("categories");
        assert_eq!(categories, vec![food]);
        let expenses = reopened.list_expenses(user).await.expect("expenses");
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Lunch");
    }

    #[tokio::test]
    async fn failed_mutation_does_not_create_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let store = JsonFileStore::open(&path).expect("open");
        let result = store.delete_category(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn concurrent_mutations_all_reach_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let user = Uuid::new_v4();
        let store = std::sync::Arc::new(JsonFileStore::open(&path).expect("open"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_category(user, NewCategory::new(format!("Cat {i}"), 10.0))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("insert");
        }

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(reopened.list_categories(user).await.unwrap().len(), 8);
        assert!(!dir.path().join("data.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_write_keeps_change_in_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let user = Uuid::new_v4();
        let store = JsonFileStore::open(&path).expect("open");
        // A directory in the staging file's place makes the write fail.
        std::fs::create_dir(dir.path().join("data.json.tmp")).expect("block tmp");

        let err = store
            .insert_category(user, NewCategory::new("Food", 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BudgetError::Io(_)));
        assert!(!path.exists());
        assert_eq!(store.list_categories(user).await.unwrap().len(), 1);

        std::fs::remove_dir(dir.path().join("data.json.tmp")).expect("unblock tmp");
        store
            .insert_category(user, NewCategory::new("Rent", 900.0))
            .await
            .expect("insert");
        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(reopened.list_categories(user).await.unwrap().len(), 2);
    }

    #[test]
    fn dangling_category_references_are_reported() {
        let user = Uuid::new_v4();
        let snapshot = StoreSnapshot {
            expenses: vec![crate::domain::Expense::from_new(
                user,
                NewExpense {
                    amount: 4.0,
                    description: "Coffee".into(),
                    date: june(1),
                    category_id: Uuid::new_v4(),
                },
            )],
            ..StoreSnapshot::default()
        };
        let warnings = snapshot_warnings(&snapshot);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("missing category"));
    }
}

//! In-process [`DataStore`] holding every table in memory.

use std::cmp::Reverse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DataStore;
use crate::core::timeframe::TimeWindow;
use crate::domain::{
    BelongsToCategory, Category, CategoryUpdate, Expense, ExpenseUpdate, Identifiable,
    NamedEntity, NewCategory, NewExpense, NewProfile, NewRecurringExpense, ProfileUpdate,
    RecurringExpense, RecurringExpenseUpdate, UserOwned, UserProfile,
};
use crate::errors::{BudgetError, Result};

/// Full contents of the four tables, as persisted by the JSON backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub recurring: Vec<RecurringExpense>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.data.read().await.clone()
    }
}

fn newest_first(mut expenses: Vec<Expense>) -> Vec<Expense> {
    expenses.sort_by_key(|e| Reverse(e.date));
    expenses
}

fn owned_by<T: UserOwned + Clone>(rows: &[T], user_id: Uuid) -> Vec<T> {
    rows.iter()
        .filter(|row| row.user_id() == user_id)
        .cloned()
        .collect()
}

fn find_owned<T: Identifiable + UserOwned>(
    rows: &mut [T],
    user_id: Uuid,
    id: Uuid,
) -> Option<&mut T> {
    rows.iter_mut()
        .find(|row| row.id() == id && row.user_id() == user_id)
}

/// Returns false when no row with `id` belongs to `user_id`.
fn remove_owned<T: Identifiable + UserOwned>(rows: &mut Vec<T>, user_id: Uuid, id: Uuid) -> bool {
    let before = rows.len();
    rows.retain(|row| !(row.id() == id && row.user_id() == user_id));
    rows.len() != before
}

fn remove_in_category<T: BelongsToCategory + UserOwned>(
    rows: &mut Vec<T>,
    user_id: Uuid,
    category_id: Uuid,
) -> usize {
    let before = rows.len();
    rows.retain(|row| !(row.category_id() == category_id && row.user_id() == user_id));
    before - rows.len()
}

fn owns_category(categories: &[Category], user_id: Uuid, category_id: Uuid) -> bool {
    categories
        .iter()
        .any(|c| c.id() == category_id && c.user_id() == user_id)
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let data = self.data.read().await;
        Ok(data.profiles.iter().find(|p| p.user_id() == user_id).cloned())
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile> {
        let mut data = self.data.write().await;
        if data.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(BudgetError::Conflict(format!(
                "profile for user {}",
                profile.user_id
            )));
        }
        let row = UserProfile::from_new(profile);
        data.profiles.push(row.clone());
        Ok(row)
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileUpdate) -> Result<UserProfile> {
        let mut data = self.data.write().await;
        let row = data
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| BudgetError::not_found("profile", user_id))?;
        row.apply(changes);
        Ok(row.clone())
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>> {
        let mut rows = owned_by(&self.data.read().await.categories, user_id);
        rows.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(rows)
    }

    async fn insert_category(&self, user_id: Uuid, category: NewCategory) -> Result<Category> {
        let row = Category::from_new(user_id, category);
        self.data.write().await.categories.push(row.clone());
        Ok(row)
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryUpdate,
    ) -> Result<Category> {
        let mut data = self.data.write().await;
        let row = find_owned(&mut data.categories, user_id, id)
            .ok_or_else(|| BudgetError::not_found("category", id))?;
        row.apply(changes);
        Ok(row.clone())
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut data = self.data.write().await;
        if !remove_owned(&mut data.categories, user_id, id) {
            return Err(BudgetError::not_found("category", id));
        }
        Ok(())
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        let rows = owned_by(&self.data.read().await.expenses, user_id);
        Ok(newest_first(rows))
    }

    async fn list_recent_expenses(&self, user_id: Uuid, limit: usize) -> Result<Vec<Expense>> {
        let mut rows = self.list_expenses(user_id).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_expenses_in_range(
        &self,
        user_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<Expense>> {
        let data = self.data.read().await;
        let rows = data
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && window.contains(e.date))
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn insert_expense(&self, user_id: Uuid, expense: NewExpense) -> Result<Expense> {
        let mut data = self.data.write().await;
        if !owns_category(&data.categories, user_id, expense.category_id) {
            return Err(BudgetError::not_found("category", expense.category_id));
        }
        let row = Expense::from_new(user_id, expense);
        data.expenses.push(row.clone());
        Ok(row)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseUpdate,
    ) -> Result<Expense> {
        let mut data = self.data.write().await;
        if let Some(category_id) = changes.category_id {
            if !owns_category(&data.categories, user_id, category_id) {
                return Err(BudgetError::not_found("category", category_id));
            }
        }
        let row = find_owned(&mut data.expenses, user_id, id)
            .ok_or_else(|| BudgetError::not_found("expense", id))?;
        row.apply(changes);
        Ok(row.clone())
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut data = self.data.write().await;
        if !remove_owned(&mut data.expenses, user_id, id) {
            return Err(BudgetError::not_found("expense", id));
        }
        Ok(())
    }

    async fn delete_expenses_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        let mut data = self.data.write().await;
        Ok(remove_in_category(&mut data.expenses, user_id, category_id))
    }

    async fn list_recurring(&self, user_id: Uuid) -> Result<Vec<RecurringExpense>> {
        let mut rows = owned_by(&self.data.read().await.recurring, user_id);
        rows.sort_by_key(|r| r.next_date);
        Ok(rows)
    }

    async fn insert_recurring(
        &self,
        user_id: Uuid,
        template: NewRecurringExpense,
    ) -> Result<RecurringExpense> {
        let mut data = self.data.write().await;
        if !owns_category(&data.categories, user_id, template.category_id) {
            return Err(BudgetError::not_found("category", template.category_id));
        }
        let row = RecurringExpense::from_new(user_id, template);
        data.recurring.push(row.clone());
        Ok(row)
    }

    async fn update_recurring(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecurringExpenseUpdate,
    ) -> Result<RecurringExpense> {
        let mut data = self.data.write().await;
        if let Some(category_id) = changes.category_id {
            if !owns_category(&data.categories, user_id, category_id) {
                return Err(BudgetError::not_found("category", category_id));
            }
        }
        let row = find_owned(&mut data.recurring, user_id, id)
            .ok_or_else(|| BudgetError::not_found("recurring expense", id))?;
        row.apply(changes);
        Ok(row.clone())
    }

    async fn delete_recurring(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut data = self.data.write().await;
        if !remove_owned(&mut data.recurring, user_id, id) {
            return Err(BudgetError::not_found("recurring expense", id));
        }
        Ok(())
    }

    async fn delete_recurring_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        let mut data = self.data.write().await;
        Ok(remove_in_category(&mut data.recurring, user_id, category_id))
    }
}

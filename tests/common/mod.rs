#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use budget_tracker::{
    config::ConfigManager,
    core::{services::ServiceContext, time::FixedClock, timeframe::TimeWindow},
    domain::{
        Category, CategoryUpdate, Expense, ExpenseUpdate, NewCategory, NewExpense, NewProfile,
        NewRecurringExpense, ProfileUpdate, RecurringExpense, RecurringExpenseUpdate, UserProfile,
    },
    errors::{BudgetError, Result},
    storage::{DataStore, InMemoryStore},
};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated base directory and a config manager rooted in it.
pub fn setup_test_env() -> (ConfigManager, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    let manager = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    (manager, base)
}

/// 2024-06-`day` at `hour`:`minute`.
pub fn june(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub ctx: ServiceContext,
}

impl Fixture {
    pub fn at(now: NaiveDateTime) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let ctx = ServiceContext::with_clock(
            store.clone(),
            Arc::new(FixedClock(now)),
            Uuid::new_v4(),
        );
        Self { store, ctx }
    }

    pub fn user_id(&self) -> Uuid {
        self.ctx.user_id
    }

    pub async fn category(&self, name: &str, budget: f64) -> Category {
        self.store
            .insert_category(self.user_id(), NewCategory::new(name, budget))
            .await
            .expect("insert category")
    }

    pub async fn expense(&self, category: &Category, amount: f64, date: NaiveDateTime) -> Expense {
        self.store
            .insert_expense(
                self.user_id(),
                NewExpense {
                    amount,
                    description: "Expense".into(),
                    date,
                    category_id: category.id,
                },
            )
            .await
            .expect("insert expense")
    }
}

/// Store double that delegates to an [`InMemoryStore`] and fails selected
/// operations on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    pub fail_profile_insert: AtomicBool,
    pub fail_recurring_cascade: AtomicBool,
    pub fail_expense_reads: AtomicBool,
    /// Range reads return every expense, as a backend that ignores the
    /// window bounds would.
    pub ignore_range: AtomicBool,
    /// Number of upcoming profile reads that report no row, simulating a
    /// concurrent client inserting it in between.
    pub hide_profile_reads: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(BudgetError::Remote(format!("{what} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataStore for FlakyStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let hidden = self
            .hide_profile_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        self.inner.get_profile(user_id).await
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile> {
        Self::check(&self.fail_profile_insert, "profile insert")?;
        self.inner.insert_profile(profile).await
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileUpdate) -> Result<UserProfile> {
        self.inner.update_profile(user_id, changes).await
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>> {
        self.inner.list_categories(user_id).await
    }

    async fn insert_category(&self, user_id: Uuid, category: NewCategory) -> Result<Category> {
        self.inner.insert_category(user_id, category).await
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryUpdate,
    ) -> Result<Category> {
        self.inner.update_category(user_id, id, changes).await
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.inner.delete_category(user_id, id).await
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        Self::check(&self.fail_expense_reads, "expense list")?;
        self.inner.list_expenses(user_id).await
    }

    async fn list_recent_expenses(&self, user_id: Uuid, limit: usize) -> Result<Vec<Expense>> {
        Self::check(&self.fail_expense_reads, "expense list")?;
        self.inner.list_recent_expenses(user_id, limit).await
    }

    async fn list_expenses_in_range(
        &self,
        user_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<Expense>> {
        Self::check(&self.fail_expense_reads, "expense range")?;
        if self.ignore_range.load(Ordering::SeqCst) {
            return self.inner.list_expenses(user_id).await;
        }
        self.inner.list_expenses_in_range(user_id, window).await
    }

    async fn insert_expense(&self, user_id: Uuid, expense: NewExpense) -> Result<Expense> {
        self.inner.insert_expense(user_id, expense).await
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseUpdate,
    ) -> Result<Expense> {
        self.inner.update_expense(user_id, id, changes).await
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.inner.delete_expense(user_id, id).await
    }

    async fn delete_expenses_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        self.inner
            .delete_expenses_for_category(user_id, category_id)
            .await
    }

    async fn list_recurring(&self, user_id: Uuid) -> Result<Vec<RecurringExpense>> {
        self.inner.list_recurring(user_id).await
    }

    async fn insert_recurring(
        &self,
        user_id: Uuid,
        template: NewRecurringExpense,
    ) -> Result<RecurringExpense> {
        self.inner.insert_recurring(user_id, template).await
    }

    async fn update_recurring(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecurringExpenseUpdate,
    ) -> Result<RecurringExpense> {
        self.inner.update_recurring(user_id, id, changes).await
    }

    async fn delete_recurring(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.inner.delete_recurring(user_id, id).await
    }

    async fn delete_recurring_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize> {
        Self::check(&self.fail_recurring_cascade, "recurring delete")?;
        self.inner
            .delete_recurring_for_category(user_id, category_id)
            .await
    }
}

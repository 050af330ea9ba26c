//! Row-level contract of the remote data store plus local implementations.
//!
//! Every operation is scoped by the owning user id. Single-row lookups report
//! absence as `Ok(None)` (profiles) or [`BudgetError::NotFound`](crate::errors::BudgetError::NotFound) (updates and
//! deletes of a specific id), never as a remote failure.

pub mod json_backend;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::timeframe::TimeWindow;
use crate::domain::{
    Category, CategoryUpdate, Expense, ExpenseUpdate, NewCategory, NewExpense, NewProfile,
    NewRecurringExpense, ProfileUpdate, RecurringExpense, RecurringExpenseUpdate, UserProfile,
};
use crate::errors::Result;

pub use json_backend::JsonFileStore;
pub use memory::InMemoryStore;

/// Abstraction over the hosted relational store holding the four tables.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;
    /// Fails with [`BudgetError::Conflict`](crate::errors::BudgetError::Conflict) when the user already has a profile.
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile>;
    async fn update_profile(&self, user_id: Uuid, changes: ProfileUpdate) -> Result<UserProfile>;

    /// Categories ordered by name ascending.
    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<Category>>;
    async fn insert_category(&self, user_id: Uuid, category: NewCategory) -> Result<Category>;
    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: CategoryUpdate,
    ) -> Result<Category>;
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<()>;

    /// All expenses, newest first.
    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>>;
    /// The `limit` newest expenses.
    async fn list_recent_expenses(&self, user_id: Uuid, limit: usize) -> Result<Vec<Expense>>;
    /// Expenses dated within `window` (inclusive on both ends), newest first.
    async fn list_expenses_in_range(
        &self,
        user_id: Uuid,
        window: TimeWindow,
    ) -> Result<Vec<Expense>>;
    async fn insert_expense(&self, user_id: Uuid, expense: NewExpense) -> Result<Expense>;
    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseUpdate,
    ) -> Result<Expense>;
    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<()>;
    /// Removes every expense filed under the category, returning the count.
    async fn delete_expenses_for_category(&self, user_id: Uuid, category_id: Uuid)
        -> Result<usize>;

    /// Templates ordered by next occurrence ascending.
    async fn list_recurring(&self, user_id: Uuid) -> Result<Vec<RecurringExpense>>;
    async fn insert_recurring(
        &self,
        user_id: Uuid,
        template: NewRecurringExpense,
    ) -> Result<RecurringExpense>;
    async fn update_recurring(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: RecurringExpenseUpdate,
    ) -> Result<RecurringExpense>;
    async fn delete_recurring(&self, user_id: Uuid, id: Uuid) -> Result<()>;
    async fn delete_recurring_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<usize>;
}

pub mod category;
pub mod common;
pub mod expense;
pub mod profile;
pub mod recurring;
pub mod summary;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use common::{Amounted, BelongsToCategory, Identifiable, NamedEntity, UserOwned};
pub use expense::{Expense, ExpenseUpdate, ExpenseView, NewExpense};
pub use profile::{NewProfile, ProfileUpdate, UserProfile};
pub use recurring::{Frequency, NewRecurringExpense, RecurringExpense, RecurringExpenseUpdate};
pub use summary::{
    BudgetSummary, CategoryProgress, CategorySlice, SpendingSummary, TrendSeries,
};

//! Per-user async facades over the data store and the aggregation engine.

pub mod analytics_service;
pub mod auth_flow;
pub mod budget_service;
pub mod dashboard;
pub mod expense_service;
pub mod onboarding;
pub mod user_service;

pub use analytics_service::{AnalyticsService, Insights};
pub use auth_flow::AuthFlow;
pub use budget_service::{BudgetService, CategoryForm};
pub use dashboard::{Dashboard, DashboardService};
pub use expense_service::{ExpenseForm, ExpenseService, RecurringForm};
pub use onboarding::{
    CategoryDraft, OnboardingDraft, OnboardingOutcome, OnboardingService, OnboardingStep,
};
pub use user_service::UserService;

use std::sync::Arc;

use uuid::Uuid;

use crate::core::time::{Clock, SystemClock};
use crate::storage::DataStore;

/// Store handle, clock and owning user shared by every service.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn DataStore>,
    pub clock: Arc<dyn Clock>,
    pub user_id: Uuid,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn DataStore>, user_id: Uuid) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), user_id)
    }

    pub fn with_clock(store: Arc<dyn DataStore>, clock: Arc<dyn Clock>, user_id: Uuid) -> Self {
        Self {
            store,
            clock,
            user_id,
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

use serde::Serialize;

use crate::core::{aggregation, timeframe::Timeframe};
use crate::domain::{BudgetSummary, CategoryProgress, ExpenseView};
use crate::errors::Result;
use crate::state::{AppState, View};

use super::{expense_service, user_service::DEFAULT_PROFILE_NAME, ServiceContext};

/// Home screen contents.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub profile_name: String,
    pub summary: BudgetSummary,
    pub recent: Vec<ExpenseView>,
    pub categories: Vec<CategoryProgress>,
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    ctx: ServiceContext,
    recent_limit: usize,
}

impl DashboardService {
    pub fn new(ctx: ServiceContext, recent_limit: usize) -> Self {
        Self { ctx, recent_limit }
    }

    /// Loads the dashboard and publishes its recent expenses to the cache,
    /// unless a newer dashboard load started in the meantime.
    pub async fn load(&self, state: &AppState) -> Result<Dashboard> {
        let ticket = state.requests().issue(View::Dashboard);
        let dashboard = self.fetch().await?;
        let recent = dashboard.recent.clone();
        state.apply_if_current(&ticket, |cache| cache.set_recent(recent));
        Ok(dashboard)
    }

    pub async fn fetch(&self) -> Result<Dashboard> {
        let user_id = self.ctx.user_id;
        let window = Timeframe::Month.window(self.ctx.clock.now());
        let store = &self.ctx.store;
        let (profile, categories, month_expenses, recent) = tokio::try_join!(
            store.get_profile(user_id),
            store.list_categories(user_id),
            store.list_expenses_in_range(user_id, window),
            store.list_recent_expenses(user_id, self.recent_limit),
        )?;
        tracing::debug!(
            categories = categories.len(),
            month_expenses = month_expenses.len(),
            "loaded dashboard rows"
        );

        Ok(Dashboard {
            profile_name: profile
                .map(|p| p.name)
                .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string()),
            summary: aggregation::budget_summary(&categories, &month_expenses),
            recent: expense_service::join_views(&recent, &categories),
            categories: aggregation::categories_with_progress(&categories, &month_expenses),
        })
    }
}

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::{aggregation, timeframe::Timeframe};
use crate::domain::{CategorySlice, Expense, SpendingSummary, TrendSeries};
use crate::errors::Result;

use super::ServiceContext;

/// Everything the insights view shows for one timeframe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Insights {
    pub timeframe: Timeframe,
    pub by_category: Vec<CategorySlice>,
    pub trends: TrendSeries,
    pub summary: SpendingSummary,
}

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    ctx: ServiceContext,
}

impl AnalyticsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn spending_by_category(&self, timeframe: Timeframe) -> Result<Vec<CategorySlice>> {
        let user_id = self.ctx.user_id;
        let window = timeframe.window(self.ctx.clock.now());
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses_in_range(user_id, window),
        )?;
        Ok(aggregation::spending_by_category(&categories, &expenses))
    }

    pub async fn spending_trends(&self, timeframe: Timeframe) -> Result<TrendSeries> {
        let now = self.ctx.clock.now();
        let expenses = self
            .ctx
            .store
            .list_expenses_in_range(self.ctx.user_id, timeframe.trend_window(now))
            .await?;
        Ok(trend_series(timeframe, &expenses, now))
    }

    pub async fn spending_summary(&self, timeframe: Timeframe) -> Result<SpendingSummary> {
        let user_id = self.ctx.user_id;
        let window = timeframe.window(self.ctx.clock.now());
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses_in_range(user_id, window),
        )?;
        Ok(aggregation::spending_summary(&categories, &expenses, window))
    }

    /// Slices, trend series and summary from a single consistent clock reading.
    pub async fn insights(&self, timeframe: Timeframe) -> Result<Insights> {
        let user_id = self.ctx.user_id;
        let now = self.ctx.clock.now();
        let window = timeframe.window(now);
        let (categories, expenses, trend_expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses_in_range(user_id, window),
            self.ctx
                .store
                .list_expenses_in_range(user_id, timeframe.trend_window(now)),
        )?;
        tracing::debug!(
            %timeframe,
            expenses = expenses.len(),
            trend_expenses = trend_expenses.len(),
            "computing insights"
        );
        Ok(Insights {
            timeframe,
            by_category: aggregation::spending_by_category(&categories, &expenses),
            trends: trend_series(timeframe, &trend_expenses, now),
            summary: aggregation::spending_summary(&categories, &expenses, window),
        })
    }
}

fn trend_series(timeframe: Timeframe, expenses: &[Expense], now: NaiveDateTime) -> TrendSeries {
    let series = aggregation::spending_trends(expenses, &timeframe.buckets(now));
    if series.unbucketed > 0.0 {
        tracing::warn!(
            %timeframe,
            unbucketed = series.unbucketed,
            "spend fell outside the trend buckets"
        );
    }
    series
}

//! Derived aggregates produced by the aggregation engine. None of these are
//! persisted; they are recomputed on every request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category::Category;

/// Monthly budget versus spend across every category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    /// Negative when the user is over budget.
    pub remaining: f64,
}

impl BudgetSummary {
    pub fn from_parts(total_budget: f64, total_spent: f64) -> Self {
        Self {
            total_budget,
            total_spent,
            remaining: total_budget - total_spent,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining < 0.0
    }
}

/// A category together with what was spent against it this month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryProgress {
    pub category: Category,
    pub spent: f64,
    pub percentage: f64,
}

impl CategoryProgress {
    pub fn new(category: Category, spent: f64) -> Self {
        let percentage = progress_percentage(spent, category.monthly_budget);
        Self {
            category,
            spent,
            percentage,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.percentage > 100.0
    }

    /// Budget left for the month; reported as an absolute overage once exceeded.
    pub fn remaining(&self) -> f64 {
        (self.category.monthly_budget - self.spent).abs()
    }
}

/// `spent / budget * 100`, or 0 when no budget is set.
pub fn progress_percentage(spent: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        spent / budget * 100.0
    } else {
        0.0
    }
}

/// One slice of the spending distribution chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySlice {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub value: f64,
}

/// Spend bucketed over the labels of a timeframe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Spend whose bucket fell outside `labels`; still part of the totals.
    pub unbucketed: f64,
}

impl TrendSeries {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Headline facts for the insights view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingSummary {
    pub total_spent: f64,
    pub avg_per_day: f64,
    pub most_expensive_category: Option<String>,
    pub most_expensive_day: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_never_divides() {
        assert_eq!(progress_percentage(250.0, 0.0), 0.0);
        assert_eq!(progress_percentage(0.0, 0.0), 0.0);
        assert!(progress_percentage(250.0, 0.0).is_finite());
    }

    #[test]
    fn remaining_reports_overage_as_absolute() {
        let category = Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Food".into(),
            icon: "🍔".into(),
            color: "#FF9500".into(),
            monthly_budget: 100.0,
        };
        let progress = CategoryProgress::new(category, 130.0);
        assert!(progress.is_over_budget());
        assert_eq!(progress.remaining(), 30.0);
        assert_eq!(progress.percentage, 130.0);
    }

    #[test]
    fn summary_remaining_can_go_negative() {
        let summary = BudgetSummary::from_parts(100.0, 175.5);
        assert_eq!(summary.remaining, -75.5);
        assert!(summary.is_over_budget());
    }
}

//! Pure folds from raw rows into the budget and analytics views.
//!
//! Every function here works on rows that were already fetched for the
//! relevant window; none of them filter by date except the trend fold, which
//! drops spend outside its buckets.

use std::{collections::HashMap, hash::Hash};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::timeframe::{TimeWindow, TrendBuckets};
use crate::domain::{
    expense::UNKNOWN_CATEGORY_NAME, Amounted, BelongsToCategory, BudgetSummary, Category,
    CategoryProgress, CategorySlice, Expense, SpendingSummary, TrendSeries,
};

/// Total budget across all categories against this month's spend.
pub fn budget_summary(categories: &[Category], expenses_this_month: &[Expense]) -> BudgetSummary {
    let total_budget = categories.iter().map(|c| c.monthly_budget).sum();
    BudgetSummary::from_parts(total_budget, total_spent(expenses_this_month))
}

/// One entry per category, in input order, with this month's spend attached.
pub fn categories_with_progress(
    categories: &[Category],
    expenses_this_month: &[Expense],
) -> Vec<CategoryProgress> {
    let spent_by_category = totals_by_category(expenses_this_month);
    categories
        .iter()
        .map(|category| {
            let spent = spent_by_category
                .get(&category.id)
                .copied()
                .unwrap_or(0.0);
            CategoryProgress::new(category.clone(), spent)
        })
        .collect()
}

/// Distribution slices for categories with at least one expense in range,
/// ordered by first appearance.
pub fn spending_by_category(categories: &[Category], expenses: &[Expense]) -> Vec<CategorySlice> {
    let lookup: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut totals = OrderedTotals::default();
    for expense in expenses {
        totals.add(expense.category_id, expense.amount);
    }
    totals
        .into_entries()
        .into_iter()
        .map(|(category_id, value)| {
            let (name, color) = match lookup.get(&category_id) {
                Some(category) => (category.name.clone(), category.color.clone()),
                None => (UNKNOWN_CATEGORY_NAME.to_string(), String::new()),
            };
            CategorySlice {
                category_id,
                name,
                color,
                value,
            }
        })
        .collect()
}

/// Sums expenses into the given buckets; empty buckets are zero.
pub fn spending_trends(expenses: &[Expense], buckets: &TrendBuckets) -> TrendSeries {
    let mut values = vec![0.0; buckets.len()];
    let mut unbucketed = 0.0;
    for expense in expenses {
        match buckets.position(expense.date) {
            Some(idx) => values[idx] += expense.amount,
            None => unbucketed += expense.amount,
        }
    }
    TrendSeries {
        labels: buckets.labels(),
        values,
        unbucketed,
    }
}

/// Totals, daily average and the leading category and day for a window.
///
/// Leaders only change on a strictly greater total, so the first entry to
/// reach the maximum keeps the title.
pub fn spending_summary(
    categories: &[Category],
    expenses: &[Expense],
    window: TimeWindow,
) -> SpendingSummary {
    let total = total_spent(expenses);
    let avg_per_day = total / window.elapsed_days() as f64;

    let mut by_category = OrderedTotals::default();
    let mut by_day: OrderedTotals<NaiveDate> = OrderedTotals::default();
    for expense in expenses {
        by_category.add(expense.category_id, expense.amount);
        by_day.add(expense.date.date(), expense.amount);
    }

    let most_expensive_category = by_category.leader().map(|category_id| {
        categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY_NAME.to_string())
    });
    let most_expensive_day = by_day.leader().map(format_day);

    SpendingSummary {
        total_spent: total,
        avg_per_day,
        most_expensive_category,
        most_expensive_day,
    }
}

pub fn total_spent<T: Amounted>(rows: &[T]) -> f64 {
    rows.iter().map(Amounted::amount).sum()
}

/// Sums amounts per category, e.g. expenses or recurring templates.
pub fn totals_by_category<T: BelongsToCategory + Amounted>(rows: &[T]) -> HashMap<Uuid, f64> {
    let mut totals: HashMap<Uuid, f64> = HashMap::new();
    for row in rows {
        *totals.entry(row.category_id()).or_default() += row.amount();
    }
    totals
}

/// Formats a calendar day as `Mon D`, e.g. `Jun 3`.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Per-key running totals that remember first-seen order.
struct OrderedTotals<K> {
    entries: Vec<(K, f64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for OrderedTotals<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> OrderedTotals<K> {
    fn add(&mut self, key: K, amount: f64) {
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].1 += amount,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, amount));
            }
        }
    }

    fn leader(&self) -> Option<K> {
        let mut best: Option<K> = None;
        let mut max = 0.0;
        for (key, total) in &self.entries {
            if *total > max {
                max = *total;
                best = Some(*key);
            }
        }
        best
    }

    fn into_entries(self) -> Vec<(K, f64)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn category(name: &str, budget: f64) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.into(),
            icon: "📝".into(),
            color: "#4A6FFF".into(),
            monthly_budget: budget,
        }
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn expense(category: &Category, amount: f64, date: NaiveDateTime) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            amount,
            description: "Expense".into(),
            date,
            category_id: category.id,
        }
    }

    #[test]
    fn leader_ties_go_to_first_seen() {
        let mut totals = OrderedTotals::default();
        totals.add("a", 50.0);
        totals.add("b", 30.0);
        totals.add("b", 20.0);
        assert_eq!(totals.leader(), Some("a"));
    }

    #[test]
    fn leader_requires_positive_total() {
        let mut totals = OrderedTotals::default();
        totals.add("a", 0.0);
        assert_eq!(totals.leader(), None);
        let empty: OrderedTotals<&str> = OrderedTotals::default();
        assert_eq!(empty.leader(), None);
    }

    #[test]
    fn summary_names_leading_category_and_day() {
        let food = category("Food", 200.0);
        let rent = category("Rent", 900.0);
        let expenses = vec![
            expense(&food, 20.0, at(3, 9)),
            expense(&rent, 15.0, at(4, 9)),
            expense(&food, 5.0, at(4, 18)),
        ];
        let window = TimeWindow::new(at(1, 0), at(5, 0));
        let summary = spending_summary(&[food, rent], &expenses, window);
        assert_eq!(summary.total_spent, 40.0);
        assert_eq!(summary.avg_per_day, 10.0);
        assert_eq!(summary.most_expensive_category.as_deref(), Some("Food"));
        assert_eq!(summary.most_expensive_day.as_deref(), Some("Jun 3"));
    }

    #[test]
    fn unknown_category_slices_are_labelled() {
        let ghost = category("Ghost", 0.0);
        let slices = spending_by_category(&[], &[expense(&ghost, 12.0, at(2, 9))]);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].name, UNKNOWN_CATEGORY_NAME);
    }

    #[test]
    fn progress_adds_up_per_category() {
        let food = category("Food", 100.0);
        let rent = category("Rent", 900.0);
        let expenses = vec![expense(&food, 30.0, at(2, 9)), expense(&food, 90.0, at(12, 9))];
        let totals = totals_by_category(&expenses);
        assert_eq!(totals.get(&food.id), Some(&120.0));
        assert!(!totals.contains_key(&rent.id));

        let progress = categories_with_progress(&[food, rent], &expenses);
        assert_eq!(progress[0].percentage, 120.0);
        assert_eq!(progress[1].spent, 0.0);
        assert_eq!(total_spent(&expenses), 120.0);
    }

    #[test]
    fn format_day_has_no_padding() {
        assert_eq!(format_day(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()), "Jun 3");
        assert_eq!(format_day(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()), "Dec 25");
    }
}

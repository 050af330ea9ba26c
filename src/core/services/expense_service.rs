//! Expense entry, history views and recurring templates.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::{timeframe::Timeframe, validation};
use crate::domain::{
    expense::DEFAULT_EXPENSE_DESCRIPTION, Category, Expense, ExpenseUpdate, ExpenseView,
    Frequency, NewExpense, NewRecurringExpense, RecurringExpense, RecurringExpenseUpdate,
};
use crate::errors::{BudgetError, Result};

use super::ServiceContext;

/// Raw add/edit expense form.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    /// Defaults to the current time when creating.
    pub date: Option<NaiveDateTime>,
}

impl ExpenseForm {
    pub fn new(amount: impl Into<String>, category_id: Uuid) -> Self {
        Self {
            amount: amount.into(),
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    fn validated(&self) -> Result<(f64, Uuid, String)> {
        let category_id = match self.category_id {
            Some(id) if !self.amount.trim().is_empty() => id,
            _ => {
                return Err(BudgetError::validation(
                    "Please enter an amount and select a category",
                ))
            }
        };
        let amount = validation::parse_amount(&self.amount)?;
        let description = match self.description.trim() {
            "" => DEFAULT_EXPENSE_DESCRIPTION.to_string(),
            text => text.to_string(),
        };
        Ok((amount, category_id, description))
    }
}

/// Raw recurring template form. Amount, description and category are required.
#[derive(Debug, Clone, Default)]
pub struct RecurringForm {
    pub amount: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub frequency: Frequency,
    /// Defaults to today when creating.
    pub next_date: Option<NaiveDate>,
}

impl RecurringForm {
    fn validated(&self) -> Result<(f64, String, Uuid)> {
        let description = self.description.trim();
        let category_id = match self.category_id {
            Some(id) if !self.amount.trim().is_empty() && !description.is_empty() => id,
            _ => return Err(BudgetError::validation("Please fill in all required fields")),
        };
        let amount = validation::parse_amount(&self.amount)?;
        Ok((amount, description.to_string(), category_id))
    }
}

pub(crate) fn join_views(expenses: &[Expense], categories: &[Category]) -> Vec<ExpenseView> {
    let lookup: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    expenses
        .iter()
        .map(|expense| ExpenseView::join(expense, lookup.get(&expense.category_id).copied()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ExpenseService {
    ctx: ServiceContext,
}

impl ExpenseService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every expense, newest first, joined with its category.
    pub async fn expenses(&self) -> Result<Vec<ExpenseView>> {
        let user_id = self.ctx.user_id;
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses(user_id),
        )?;
        Ok(join_views(&expenses, &categories))
    }

    pub async fn recent_expenses(&self, limit: usize) -> Result<Vec<ExpenseView>> {
        let user_id = self.ctx.user_id;
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_recent_expenses(user_id, limit),
        )?;
        Ok(join_views(&expenses, &categories))
    }

    pub async fn expenses_for_timeframe(&self, timeframe: Timeframe) -> Result<Vec<ExpenseView>> {
        let user_id = self.ctx.user_id;
        let window = timeframe.window(self.ctx.clock.now());
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses_in_range(user_id, window),
        )?;
        tracing::debug!(%timeframe, expenses = expenses.len(), "fetched timeframe expenses");
        Ok(join_views(&expenses, &categories))
    }

    pub async fn add_expense(&self, form: ExpenseForm) -> Result<ExpenseView> {
        let (amount, category_id, description) = form.validated()?;
        let new = NewExpense {
            amount,
            description,
            date: form.date.unwrap_or_else(|| self.ctx.clock.now()),
            category_id,
        };
        let expense = self.ctx.store.insert_expense(self.ctx.user_id, new).await?;
        tracing::info!(expense_id = %expense.id, amount, "expense added");
        self.view_of(&expense).await
    }

    pub async fn update_expense(&self, id: Uuid, form: ExpenseForm) -> Result<ExpenseView> {
        let (amount, category_id, description) = form.validated()?;
        let changes = ExpenseUpdate {
            amount: Some(amount),
            description: Some(description),
            date: form.date,
            category_id: Some(category_id),
        };
        let expense = self
            .ctx
            .store
            .update_expense(self.ctx.user_id, id, changes)
            .await?;
        tracing::info!(expense_id = %id, "expense updated");
        self.view_of(&expense).await
    }

    pub async fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.ctx.store.delete_expense(self.ctx.user_id, id).await?;
        tracing::info!(expense_id = %id, "expense deleted");
        Ok(())
    }

    pub async fn recurring(&self) -> Result<Vec<RecurringExpense>> {
        self.ctx.store.list_recurring(self.ctx.user_id).await
    }

    pub async fn add_recurring(&self, form: RecurringForm) -> Result<RecurringExpense> {
        let (amount, description, category_id) = form.validated()?;
        let template = NewRecurringExpense {
            amount,
            description,
            category_id,
            frequency: form.frequency,
            next_date: form.next_date.unwrap_or_else(|| self.ctx.clock.today()),
        };
        let row = self
            .ctx
            .store
            .insert_recurring(self.ctx.user_id, template)
            .await?;
        tracing::info!(recurring_id = %row.id, frequency = %row.frequency, "recurring expense added");
        Ok(row)
    }

    pub async fn update_recurring(&self, id: Uuid, form: RecurringForm) -> Result<RecurringExpense> {
        let (amount, description, category_id) = form.validated()?;
        let changes = RecurringExpenseUpdate {
            amount: Some(amount),
            description: Some(description),
            category_id: Some(category_id),
            frequency: Some(form.frequency),
            next_date: form.next_date,
        };
        let row = self
            .ctx
            .store
            .update_recurring(self.ctx.user_id, id, changes)
            .await?;
        tracing::info!(recurring_id = %id, "recurring expense updated");
        Ok(row)
    }

    pub async fn delete_recurring(&self, id: Uuid) -> Result<()> {
        self.ctx.store.delete_recurring(self.ctx.user_id, id).await?;
        tracing::info!(recurring_id = %id, "recurring expense deleted");
        Ok(())
    }

    /// Templates whose next occurrence is today or earlier. Nothing is
    /// recorded; the user decides whether to log them.
    pub async fn due_recurring(&self) -> Result<Vec<RecurringExpense>> {
        let today = self.ctx.clock.today();
        let mut templates = self.recurring().await?;
        templates.retain(|template| template.is_due(today));
        Ok(templates)
    }

    async fn view_of(&self, expense: &Expense) -> Result<ExpenseView> {
        let categories = self.ctx.store.list_categories(self.ctx.user_id).await?;
        let category = categories.iter().find(|c| c.id == expense.category_id);
        Ok(ExpenseView::join(expense, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_description_defaults() {
        let (amount, _, description) = ExpenseForm::new("12.5", Uuid::new_v4())
            .described("   ")
            .validated()
            .expect("valid");
        assert_eq!(amount, 12.5);
        assert_eq!(description, "Expense");
    }

    #[test]
    fn missing_category_or_amount_is_rejected_first() {
        let form = ExpenseForm {
            amount: "10".into(),
            ..ExpenseForm::default()
        };
        let err = form.validated().unwrap_err();
        assert_eq!(err.to_string(), "Please enter an amount and select a category");

        let err = ExpenseForm::new("", Uuid::new_v4()).validated().unwrap_err();
        assert_eq!(err.to_string(), "Please enter an amount and select a category");

        let err = ExpenseForm::new("ten", Uuid::new_v4()).validated().unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid amount");
    }

    #[test]
    fn recurring_form_requires_description() {
        let form = RecurringForm {
            amount: "9.99".into(),
            description: " ".into(),
            category_id: Some(Uuid::new_v4()),
            ..RecurringForm::default()
        };
        let err = form.validated().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
    }
}

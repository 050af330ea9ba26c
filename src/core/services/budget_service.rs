//! Category management and the this-month budget views.

use uuid::Uuid;

use crate::core::{aggregation, palette, timeframe::Timeframe, validation};
use crate::domain::{
    BudgetSummary, Category, CategoryProgress, CategoryUpdate, Expense, NewCategory,
};
use crate::errors::Result;

use super::ServiceContext;

/// Raw category form input. The budget stays textual until validated.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub monthly_budget: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryForm {
    pub fn new(name: impl Into<String>, monthly_budget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            monthly_budget: monthly_budget.into(),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn validated(&self) -> Result<(String, f64)> {
        let name = validation::require_name(&self.name, "category")?;
        let budget = validation::parse_budget(&self.monthly_budget)?;
        Ok((name, budget))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct BudgetService {
    ctx: ServiceContext,
}

impl BudgetService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.ctx.store.list_categories(self.ctx.user_id).await
    }

    /// Validates the form and inserts the category. Without an explicit colour
    /// the next palette entry is used.
    pub async fn add_category(&self, form: CategoryForm) -> Result<Category> {
        let (name, budget) = form.validated()?;
        let color = match non_blank(form.color) {
            Some(color) => color,
            None => {
                let existing = self.categories().await?.len();
                palette::color_for_index(existing).to_string()
            }
        };
        let mut new = NewCategory::new(name, budget).with_color(color);
        if let Some(icon) = non_blank(form.icon) {
            new = new.with_icon(icon);
        }
        let category = self.ctx.store.insert_category(self.ctx.user_id, new).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, form: CategoryForm) -> Result<Category> {
        let (name, budget) = form.validated()?;
        let changes = CategoryUpdate {
            name: Some(name),
            monthly_budget: Some(budget),
            icon: non_blank(form.icon),
            color: non_blank(form.color),
        };
        let category = self
            .ctx
            .store
            .update_category(self.ctx.user_id, id, changes)
            .await?;
        tracing::info!(category_id = %id, "category updated");
        Ok(category)
    }

    /// Deletes the category after its expenses and recurring templates. A
    /// failure part-way leaves the earlier deletions in place.
    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        let user_id = self.ctx.user_id;
        let expenses = self
            .ctx
            .store
            .delete_expenses_for_category(user_id, id)
            .await?;
        let templates = self
            .ctx
            .store
            .delete_recurring_for_category(user_id, id)
            .await?;
        self.ctx.store.delete_category(user_id, id).await?;
        tracing::info!(
            category_id = %id,
            expenses,
            templates,
            "category deleted with dependents"
        );
        Ok(())
    }

    pub async fn budget_summary(&self) -> Result<BudgetSummary> {
        let (categories, expenses) = self.month_rows().await?;
        Ok(aggregation::budget_summary(&categories, &expenses))
    }

    pub async fn categories_with_progress(&self) -> Result<Vec<CategoryProgress>> {
        let (categories, expenses) = self.month_rows().await?;
        Ok(aggregation::categories_with_progress(&categories, &expenses))
    }

    /// Categories and this month's expenses, fetched concurrently.
    async fn month_rows(&self) -> Result<(Vec<Category>, Vec<Expense>)> {
        let window = Timeframe::Month.window(self.ctx.clock.now());
        let user_id = self.ctx.user_id;
        let (categories, expenses) = tokio::try_join!(
            self.ctx.store.list_categories(user_id),
            self.ctx.store.list_expenses_in_range(user_id, window),
        )?;
        tracing::debug!(
            categories = categories.len(),
            expenses = expenses.len(),
            "fetched month rows"
        );
        Ok((categories, expenses))
    }
}

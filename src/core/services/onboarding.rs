//! Three-step first-run setup: finances, category selection, budgets.

use crate::core::palette::{self, CategoryPreset, DEFAULT_CATEGORIES};
use crate::domain::{
    category::DEFAULT_CATEGORY_ICON, Category, NewCategory, ProfileUpdate, UserProfile,
};
use crate::errors::{BudgetError, Result};
use crate::state::AppState;

use super::{user_service::UserService, ServiceContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Finances,
    Categories,
    Budgets,
}

impl OnboardingStep {
    pub fn number(self) -> u8 {
        match self {
            OnboardingStep::Finances => 1,
            OnboardingStep::Categories => 2,
            OnboardingStep::Budgets => 3,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            OnboardingStep::Finances => Some(OnboardingStep::Categories),
            OnboardingStep::Categories => Some(OnboardingStep::Budgets),
            OnboardingStep::Budgets => None,
        }
    }
}

/// A category chosen during setup, with its budget still as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub budget: String,
}

impl CategoryDraft {
    pub fn from_preset(preset: CategoryPreset) -> Self {
        Self {
            name: preset.name.to_string(),
            icon: preset.icon.to_string(),
            color: preset.color.to_string(),
            budget: String::new(),
        }
    }

    /// Unparseable or negative budgets are stored as zero.
    fn to_new(&self) -> NewCategory {
        let budget = self
            .budget
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(0.0);
        NewCategory::new(self.name.clone(), budget)
            .with_icon(self.icon.clone())
            .with_color(self.color.clone())
    }
}

/// Form state accumulated across the onboarding steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingDraft {
    pub monthly_income: String,
    pub savings_goal: String,
    pub categories: Vec<CategoryDraft>,
}

impl OnboardingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Selects the preset, or deselects it when already chosen.
    pub fn toggle(&mut self, preset: CategoryPreset) {
        if self.is_selected(preset.name) {
            self.categories.retain(|c| c.name != preset.name);
        } else {
            self.categories.push(CategoryDraft::from_preset(preset));
        }
    }

    /// Adds a user-named category coloured from the palette.
    pub fn add_custom(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BudgetError::validation("Please enter a category name"));
        }
        let color = palette::color_for_index(DEFAULT_CATEGORIES.len() + self.categories.len());
        self.categories.push(CategoryDraft {
            name: name.to_string(),
            icon: DEFAULT_CATEGORY_ICON.to_string(),
            color: color.to_string(),
            budget: String::new(),
        });
        Ok(())
    }

    pub fn set_budget(&mut self, name: &str, amount: impl Into<String>) {
        if let Some(draft) = self.categories.iter_mut().find(|c| c.name == name) {
            draft.budget = amount.into();
        }
    }

    pub fn finances(&self) -> Result<(f64, f64)> {
        let income = self.monthly_income.trim();
        let savings = self.savings_goal.trim();
        if income.is_empty() || savings.is_empty() {
            return Err(BudgetError::validation(
                "Please enter both your monthly income and savings goal",
            ));
        }
        match (income.parse::<f64>(), savings.parse::<f64>()) {
            (Ok(income), Ok(savings)) if income.is_finite() && savings.is_finite() => {
                Ok((income, savings))
            }
            _ => Err(BudgetError::validation("Please enter valid numbers")),
        }
    }

    /// Validates the input gathered by `step` before moving past it.
    pub fn check(&self, step: OnboardingStep) -> Result<()> {
        match step {
            OnboardingStep::Finances => self.finances().map(|_| ()),
            OnboardingStep::Categories if self.categories.is_empty() => Err(
                BudgetError::validation("Please select at least one category"),
            ),
            OnboardingStep::Categories | OnboardingStep::Budgets => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingOutcome {
    pub profile: UserProfile,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone)]
pub struct OnboardingService {
    ctx: ServiceContext,
}

impl OnboardingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Saves the profile as onboarded, then creates each selected category.
    /// Categories created before a failure are kept.
    pub async fn complete(
        &self,
        draft: &OnboardingDraft,
        state: &AppState,
    ) -> Result<OnboardingOutcome> {
        let (income, savings) = draft.finances()?;
        draft.check(OnboardingStep::Categories)?;

        let profile = UserService::new(self.ctx.clone())
            .update_profile(ProfileUpdate {
                monthly_income: Some(income),
                savings_goal: Some(savings),
                is_onboarded: Some(true),
                ..ProfileUpdate::default()
            })
            .await?;

        let mut categories = Vec::with_capacity(draft.categories.len());
        for category in &draft.categories {
            let row = self
                .ctx
                .store
                .insert_category(self.ctx.user_id, category.to_new())
                .await?;
            categories.push(row);
        }

        state.set_onboarded(true);
        tracing::info!(
            user_id = %self.ctx.user_id,
            categories = categories.len(),
            "onboarding completed"
        );
        Ok(OnboardingOutcome {
            profile,
            categories,
        })
    }
}

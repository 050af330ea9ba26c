//! Domain types representing budget categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A user-defined spending bucket with a monthly budget cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub monthly_budget: f64,
}

impl Category {
    pub fn from_new(user_id: Uuid, new: NewCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: new.name,
            icon: new.icon,
            color: new.color,
            monthly_budget: new.monthly_budget,
        }
    }

    /// Applies the populated fields of `changes` in place.
    pub fn apply(&mut self, changes: CategoryUpdate) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(icon) = changes.icon {
            self.icon = icon;
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(budget) = changes.monthly_budget {
            self.monthly_budget = budget;
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl UserOwned for Category {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Insert payload for a category row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub monthly_budget: f64,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, monthly_budget: f64) -> Self {
        Self {
            name: name.into(),
            icon: DEFAULT_CATEGORY_ICON.into(),
            color: String::new(),
            monthly_budget,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Partial update for a category row; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub monthly_budget: Option<f64>,
}

/// Glyph used for categories created without an explicit icon.
pub const DEFAULT_CATEGORY_ICON: &str = "📝";

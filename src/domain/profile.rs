//! User profile rows (one per authenticated user).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub savings_goal: Option<f64>,
    #[serde(default)]
    pub is_onboarded: bool,
}

impl UserProfile {
    pub fn from_new(new: NewProfile) -> Self {
        Self {
            user_id: new.user_id,
            name: new.name,
            monthly_income: None,
            savings_goal: None,
            is_onboarded: new.is_onboarded,
        }
    }

    pub fn apply(&mut self, changes: ProfileUpdate) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(income) = changes.monthly_income {
            self.monthly_income = Some(income);
        }
        if let Some(goal) = changes.savings_goal {
            self.savings_goal = Some(goal);
        }
        if let Some(onboarded) = changes.is_onboarded {
            self.is_onboarded = onboarded;
        }
    }
}

impl NamedEntity for UserProfile {
    fn name(&self) -> &str {
        &self.name
    }
}

impl UserOwned for UserProfile {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub name: String,
    pub is_onboarded: bool,
}

impl NewProfile {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            is_onboarded: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub monthly_income: Option<f64>,
    pub savings_goal: Option<f64>,
    pub is_onboarded: Option<bool>,
}

//! Expense rows and the category-joined view handed to callers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{category::Category, common::*};

/// Description stored when the user leaves the field blank.
pub const DEFAULT_EXPENSE_DESCRIPTION: &str = "Expense";

/// A single spend recorded against a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub category_id: Uuid,
}

impl Expense {
    pub fn from_new(user_id: Uuid, new: NewExpense) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount: new.amount,
            description: new.description,
            date: new.date,
            category_id: new.category_id,
        }
    }

    pub fn apply(&mut self, changes: ExpenseUpdate) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl BelongsToCategory for Expense {
    fn category_id(&self) -> Uuid {
        self.category_id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl UserOwned for Expense {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub category_id: Option<Uuid>,
}

/// Expense joined with the presentation fields of its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseView {
    pub id: Uuid,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_icon: String,
    pub category_color: String,
}

impl ExpenseView {
    pub fn join(expense: &Expense, category: Option<&Category>) -> Self {
        let (name, icon, color) = match category {
            Some(category) => (
                category.name.clone(),
                category.icon.clone(),
                category.color.clone(),
            ),
            None => (UNKNOWN_CATEGORY_NAME.into(), String::new(), String::new()),
        };
        Self {
            id: expense.id,
            amount: expense.amount,
            description: expense.description.clone(),
            date: expense.date,
            category_id: expense.category_id,
            category_name: name,
            category_icon: icon,
            category_color: color,
        }
    }
}

/// Label used when a row references a category that no longer resolves.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown Category";

//! Recurring expense templates.
//!
//! Templates describe spend that repeats on a fixed cadence. They are never
//! turned into [`Expense`](crate::domain::expense::Expense) rows automatically;
//! callers list the due ones and let the user record them.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::errors::BudgetError;

/// Supported repeat cadences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for Frequency {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(BudgetError::validation(format!(
                "Unknown frequency `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub category_id: Uuid,
    pub frequency: Frequency,
    pub next_date: NaiveDate,
}

impl RecurringExpense {
    pub fn from_new(user_id: Uuid, new: NewRecurringExpense) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount: new.amount,
            description: new.description,
            category_id: new.category_id,
            frequency: new.frequency,
            next_date: new.next_date,
        }
    }

    pub fn apply(&mut self, changes: RecurringExpenseUpdate) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(frequency) = changes.frequency {
            self.frequency = frequency;
        }
        if let Some(next_date) = changes.next_date {
            self.next_date = next_date;
        }
    }

    /// A template is due once its next occurrence is on or before `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_date <= today
    }
}

impl Identifiable for RecurringExpense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl BelongsToCategory for RecurringExpense {
    fn category_id(&self) -> Uuid {
        self.category_id
    }
}

impl Amounted for RecurringExpense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl UserOwned for RecurringExpense {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRecurringExpense {
    pub amount: f64,
    pub description: String,
    pub category_id: Uuid,
    pub frequency: Frequency,
    pub next_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpenseUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub frequency: Option<Frequency>,
    pub next_date: Option<NaiveDate>,
}

#![doc(test(attr(deny(warnings))))]

//! Budget Tracker is the client core of a personal budgeting app: category
//! budgets, expense entry, recurring templates and spending analytics over a
//! remote relational store, plus the auth flow and state that tie them to a
//! signed-in user.
//!
//! The aggregation engine in [`core::aggregation`] is pure; services in
//! [`core::services`] fetch rows through [`storage::DataStore`] and fold them.
//!
//! ```
//! use budget_tracker::core::timeframe::Timeframe;
//!
//! assert_eq!(Timeframe::parse("quarter"), Timeframe::Month);
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod state;
pub mod storage;
pub mod utils;

pub use errors::{BudgetError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Tracker tracing initialized.");
    });
}

//! Form-level checks applied before any store call.

use crate::errors::{BudgetError, Result};

/// Minimum accepted password length on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Parses an expense amount; it must be a finite number greater than zero.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation("Please enter an amount"));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(BudgetError::validation("Please enter a valid amount")),
    }
}

/// Parses a monthly budget; zero is allowed, negatives are not.
pub fn parse_budget(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(BudgetError::validation("Please enter a valid budget amount")),
    }
}

/// Trims and rejects blank names.
pub fn require_name(raw: &str, what: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(BudgetError::validation(format!("Please enter a {what} name")))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn check_sign_in(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(BudgetError::validation(
            "Please enter both email and password",
        ));
    }
    Ok(())
}

pub fn check_sign_up(email: &str, password: &str, display_name: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() || display_name.trim().is_empty() {
        return Err(BudgetError::validation("Please fill in all fields"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BudgetError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive_numbers() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), 12.5);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-4").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn budgets_accept_zero_but_not_negative() {
        assert_eq!(parse_budget("0").unwrap(), 0.0);
        assert_eq!(parse_budget("450").unwrap(), 450.0);
        assert!(parse_budget("-1").is_err());
        assert!(parse_budget("lots").is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(require_name("  Food ", "category").unwrap(), "Food");
        let err = require_name("   ", "category").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a category name");
    }

    #[test]
    fn sign_up_enforces_password_length() {
        assert!(check_sign_up("a@b.c", "12345", "Ana").is_err());
        assert!(check_sign_up("a@b.c", "123456", "Ana").is_ok());
        assert!(check_sign_up("a@b.c", "123456", " ").is_err());
        assert!(check_sign_in("", "secret").is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::timeframe::Timeframe;
use crate::utils::{
    paths,
    persistence::{ensure_dir, load_json_or_default, save_json_atomic},
};

/// Number of rows shown in the dashboard's recent expense list.
pub const DEFAULT_RECENT_EXPENSE_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub recent_expense_limit: usize,
    pub default_timeframe: Timeframe,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "$".into(),
            recent_expense_limit: DEFAULT_RECENT_EXPENSE_LIMIT,
            default_timeframe: Timeframe::Month,
            data_file: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_expense_limit == 0 {
            return Err(ConfigError::Invalid(
                "recent_expense_limit must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        Ok(())
    }

    /// Renders an amount with the configured currency symbol, e.g. `$12.50`.
    pub fn format_amount(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.currency, amount.abs())
        } else {
            format!("{}{:.2}", self.currency, amount)
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    /// Loads the stored config, falling back to defaults when none was saved.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config = load_json_or_default::<Config, ConfigError>(&self.path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        save_json_atomic(config, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Data file from the config, or `data.json` beside it.
    pub fn data_file(&self, config: &Config) -> PathBuf {
        config
            .data_file
            .clone()
            .unwrap_or_else(|| paths::data_file_in(&self.base))
    }

    pub fn accounts_file(&self) -> PathBuf {
        paths::accounts_file_in(&self.base)
    }
}

use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".budget_tracker";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "data.json";
const ACCOUNTS_FILE: &str = "accounts.json";

/// Application data directory: `$BUDGET_TRACKER_HOME`, else `~/.budget_tracker`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BUDGET_TRACKER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Default location of the JSON store snapshot.
pub fn data_file_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_FILE)
}

/// Location of the local credential registry used by the CLI.
pub fn accounts_file_in(base: &std::path::Path) -> PathBuf {
    base.join(ACCOUNTS_FILE)
}

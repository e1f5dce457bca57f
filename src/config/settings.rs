//! Ledger settings loaded from `config.toml`.
//!
//! The file names the budget owner and the accounts (with their envelopes)
//! that should exist on startup. A missing file is not an error: the ledger
//! simply starts empty for the default owner.

use crate::entities::{AccountType, CategoryType};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_OWNER: &str = "default";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Owner the seeded accounts and budgets belong to
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Accounts to seed
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            accounts: Vec::new(),
        }
    }
}

/// Configuration for a single account
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountConfig {
    pub name: String,
    pub account_type: AccountType,
    /// Opening balance in cents
    #[serde(default)]
    pub opening_balance: i64,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub is_goal_tracking: bool,
    /// Envelopes backed by this account in each month's budget
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Configuration for a single envelope
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    pub category_type: CategoryType,
    #[serde(default)]
    pub group: Option<String>,
    /// Monthly allocation in cents
    #[serde(default)]
    pub allocation: i64,
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

/// Path of the settings file: `ENVELOPE_LEDGER_CONFIG` or `./config.toml`.
#[must_use]
pub fn settings_path() -> String {
    std::env::var("ENVELOPE_LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Loads settings from a TOML file, falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed, or if a
/// category carries a negative allocation.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    for account in &settings.accounts {
        for category in &account.categories {
            if category.allocation < 0 {
                return Err(Error::Config {
                    message: format!(
                        "Category '{}' in account '{}' has a negative allocation",
                        category.name, account.name
                    ),
                });
            }
        }
    }

    Ok(settings)
}

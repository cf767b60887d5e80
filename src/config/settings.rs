//! User settings for Bookkeeper
//!
//! Display preferences and first-run behaviour, persisted as JSON.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::BookkeeperPaths;
use crate::error::BookkeeperError;

/// User settings for Bookkeeper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version of this settings file
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format for display (strftime format); storage always uses ISO-8601
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Seed the default category tree on `init`
    #[serde(default = "default_true")]
    pub default_categories: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_categories: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &BookkeeperPaths) -> Result<Self, BookkeeperError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| BookkeeperError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            BookkeeperError::Config(format!("Failed to parse settings file: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise fail only when used
    pub fn validate(&self) -> Result<(), BookkeeperError> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(BookkeeperError::Config(format!(
                "Invalid date_format '{}' in settings file",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BookkeeperPaths) -> Result<(), BookkeeperError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            BookkeeperError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| BookkeeperError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Format an amount with the configured currency symbol
    pub fn format_amount(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.currency_symbol, -amount)
        } else {
            format!("{}{:.2}", self.currency_symbol, amount)
        }
    }
}

//! User settings for Cashiro
//!
//! Preferences that are not part of the financial data itself: backup
//! retention, display options and subscription reminders.

use serde::{Deserialize, Serialize};

use super::paths::CashiroPaths;
use crate::error::CashiroError;

/// Backup retention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// User settings stored in `config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Days ahead of a due date at which a subscription counts as "due soon"
    #[serde(default = "default_reminder_days")]
    pub reminder_days: u32,

    /// Take a backup of the current data before restoring another one
    #[serde(default = "default_true")]
    pub backup_before_restore: bool,

    /// Show amounts as 1.2K / 3.4M in tables
    #[serde(default)]
    pub compact_amounts: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_reminder_days() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention: BackupRetention::default(),
            date_format: default_date_format(),
            reminder_days: default_reminder_days(),
            backup_before_restore: true,
            compact_amounts: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &CashiroPaths) -> Result<Self, CashiroError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Written on the first `config set` or `init`
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| CashiroError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| CashiroError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CashiroPaths) -> Result<(), CashiroError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CashiroError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CashiroError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

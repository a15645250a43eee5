//! Path management for Cashiro
//!
//! Resolves where configuration, data files, backups and exports live.
//!
//! ## Path Resolution Order
//!
//! 1. `CASHIRO_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/cashiro` on Linux, `~/Library/Application Support/cashiro`
//!    on macOS, `%APPDATA%\cashiro\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::CashiroError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CASHIRO_DATA_DIR";

/// Manages all paths used by Cashiro
#[derive(Debug, Clone)]
pub struct CashiroPaths {
    base_dir: PathBuf,
}

impl CashiroPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, CashiroError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "cashiro")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    CashiroError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.data_dir().join("accounts.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn subscriptions_file(&self) -> PathBuf {
        self.data_dir().join("subscriptions.json")
    }

    pub fn profile_file(&self) -> PathBuf {
        self.data_dir().join("profile.json")
    }

    pub fn rates_file(&self) -> PathBuf {
        self.data_dir().join("rates.json")
    }

    /// Ensure the base, data, backup and export directories exist
    pub fn ensure_directories(&self) -> Result<(), CashiroError> {
        for (label, dir) in [
            ("base", self.base_dir.clone()),
            ("data", self.data_dir()),
            ("backup", self.backup_dir()),
            ("export", self.export_dir()),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                CashiroError::Io(format!("Failed to create {} directory: {}", label, e))
            })?;
        }
        Ok(())
    }

    /// Check if Cashiro has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

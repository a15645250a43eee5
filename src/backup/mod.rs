//! Backup system for Cashiro
//!
//! - `BackupManager` writes archives into the backup directory and applies
//!   the retention policy.
//! - `RestoreManager` validates archives and replaces the current data with
//!   their contents.
//!
//! # Archive format
//!
//! One pretty-printed JSON document:
//! - `format`: always `"cashiro-backup"`
//! - `schema_version`: layout version, currently 1
//! - `created_at`, `app_version`
//! - `data`: profile, accounts, categories, transactions, subscriptions and
//!   exchange rates
//!
//! # Retention
//!
//! The oldest backup of each calendar month counts as a monthly backup. By
//! default 30 daily and 12 monthly backups are kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use cashiro::backup::{BackupManager, RestoreManager};
//! use cashiro::config::{paths::CashiroPaths, settings::BackupRetention};
//! use cashiro::storage::Storage;
//!
//! let paths = CashiroPaths::new()?;
//! let storage = Storage::open(paths.clone())?;
//! let manager = BackupManager::new(&paths, BackupRetention::default());
//! let (backup_path, _pruned) = manager.create_backup_with_retention(&storage)?;
//!
//! let result = RestoreManager::new(&storage).restore_from_file(&backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{
    BackupArchive, BackupInfo, BackupManager, BACKUP_FORMAT, BACKUP_SCHEMA_VERSION,
};
pub use restore::{
    read_archive, validate_archive, RecordCounts, RestoreManager, RestoreResult,
    ValidationResult,
};

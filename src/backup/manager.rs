//! Backup manager for Cashiro
//!
//! Writes the whole data set as one JSON archive into the backup directory
//! and prunes old archives according to the retention policy.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::paths::CashiroPaths;
use crate::config::settings::BackupRetention;
use crate::error::{CashiroError, CashiroResult};
use crate::storage::{write_json_atomic, Snapshot, Storage};

/// Value of the `format` field in every archive
pub const BACKUP_FORMAT: &str = "cashiro-backup";

/// Newest archive layout this build can read
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

const FILE_PREFIX: &str = "cashiro-backup-";

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Oldest backup of its calendar month; kept under the monthly quota
    pub is_monthly: bool,
}

/// On-disk backup layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupArchive {
    pub format: String,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    /// Version of Cashiro that wrote the archive
    #[serde(default)]
    pub app_version: String,
    pub data: Snapshot,
}

impl BackupArchive {
    pub fn new(data: Snapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            format: BACKUP_FORMAT.to_string(),
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            data,
        }
    }

    pub fn from_storage(storage: &Storage) -> CashiroResult<Self> {
        Ok(Self::new(storage.snapshot()?, Utc::now()))
    }
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: &CashiroPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Write a new archive of everything in `storage`; returns its path
    pub fn create_backup(&self, storage: &Storage) -> CashiroResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            CashiroError::Backup(format!("Failed to create backup directory: {}", e))
        })?;

        let mut created_at = Utc::now();
        let mut path = self.backup_dir.join(backup_filename(created_at));
        // Two backups within the same millisecond get consecutive names
        while path.exists() {
            created_at += Duration::milliseconds(1);
            path = self.backup_dir.join(backup_filename(created_at));
        }

        let archive = BackupArchive::new(storage.snapshot()?, created_at);
        write_json_atomic(&path, &archive)
            .map_err(|e| CashiroError::Backup(format!("Failed to write backup: {}", e)))?;

        info!(
            path = %path.display(),
            records = archive.data.record_count(),
            "created backup"
        );
        Ok(path)
    }

    /// Write an archive to an arbitrary location
    pub fn export_to(&self, storage: &Storage, path: &Path) -> CashiroResult<BackupArchive> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CashiroError::Backup(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let archive = BackupArchive::from_storage(storage)?;
        write_json_atomic(path, &archive)
            .map_err(|e| CashiroError::Backup(format!("Failed to write backup: {}", e)))?;
        Ok(archive)
    }

    /// All backups in the backup directory, newest first
    pub fn list_backups(&self) -> CashiroResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        // oldest first to find each month's first backup
        backups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut months_seen = HashSet::new();
        for backup in &mut backups {
            let month = (backup.created_at.year(), backup.created_at.month());
            backup.is_monthly = months_seen.insert(month);
        }
        backups.reverse();

        Ok(backups)
    }

    /// Delete backups beyond the retention counts; returns what was deleted
    pub fn enforce_retention(&self) -> CashiroResult<Vec<PathBuf>> {
        let (monthly, daily): (Vec<_>, Vec<_>) =
            self.list_backups()?.into_iter().partition(|b| b.is_monthly);

        let expired = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        let mut deleted = Vec::new();
        for backup in expired {
            fs::remove_file(&backup.path).map_err(|e| {
                CashiroError::Backup(format!("Failed to delete old backup: {}", e))
            })?;
            debug!(path = %backup.path.display(), "removed expired backup");
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    pub fn create_backup_with_retention(
        &self,
        storage: &Storage,
    ) -> CashiroResult<(PathBuf, Vec<PathBuf>)> {
        let path = self.create_backup(storage)?;
        let deleted = self.enforce_retention()?;
        Ok((path, deleted))
    }

    /// Look up a backup by file name
    pub fn get_backup(&self, filename: &str) -> CashiroResult<Option<BackupInfo>> {
        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == filename))
    }

    pub fn get_latest_backup(&self) -> CashiroResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn backup_filename(at: DateTime<Utc>) -> String {
    format!(
        "{}{}-{:03}.json",
        FILE_PREFIX,
        at.format("%Y%m%d-%H%M%S"),
        at.timestamp_subsec_millis()
    )
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let stamp = filename.strip_prefix(FILE_PREFIX)?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

/// `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let mut parts = stamp.split('-');
    let (date, time, millis) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || date.len() != 8 || time.len() != 6 || millis.len() != 3 {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(
        date[0..4].parse().ok()?,
        date[4..6].parse().ok()?,
        date[6..8].parse().ok()?,
    )?;
    let time = chrono::NaiveTime::from_hms_milli_opt(
        time[0..2].parse().ok()?,
        time[2..4].parse().ok()?,
        time[4..6].parse().ok()?,
        millis.parse().ok()?,
    )?;

    Some(DateTime::from_naive_utc_and_offset(
        chrono::NaiveDateTime::new(date, time),
        Utc,
    ))
}

//! Backup CLI commands

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::settings::Settings;
use crate::error::{CashiroError, CashiroResult};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a backup now and apply the retention policy
    Create,
    /// List backups, newest first
    List {
        /// Show dates and sizes in full
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check a backup and show what it contains
    Info {
        /// Backup file name, path, or "latest"
        backup: String,
    },
    /// Replace all current data with a backup
    Restore {
        /// Backup file name, path, or "latest"
        backup: String,
        /// Skip the confirmation step
        #[arg(short, long)]
        force: bool,
    },
    /// Delete backups beyond the retention policy
    Prune {
        #[arg(short, long)]
        force: bool,
    },
    /// Write a backup archive to any path
    Export {
        /// Destination file
        path: PathBuf,
    },
}

pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> CashiroResult<()> {
    let retention = settings.backup_retention.clone();
    let manager = BackupManager::new(storage.paths(), retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (path, pruned) = manager.create_backup_with_retention(storage)?;
            println!("Backup created: {}", file_name(&path));
            println!("Location: {}", path.display());
            if !pruned.is_empty() {
                println!("Removed {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;
            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: cashiro backup create");
                return Ok(());
            }

            println!("Backups in {}", manager.backup_dir().display());
            println!();
            for (i, backup) in backups.iter().enumerate() {
                let age = format_age(Utc::now().signed_duration_since(backup.created_at));
                let monthly = if backup.is_monthly { " [monthly]" } else { "" };
                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}",
                        i + 1,
                        backup.filename,
                        monthly,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        human_size(backup.size_bytes),
                        age,
                    );
                } else {
                    println!(
                        "  {:>2}. {}  {} old, {}{}",
                        i + 1,
                        backup.filename,
                        age,
                        human_size(backup.size_bytes),
                        monthly,
                    );
                }
            }
            println!();
            println!("{} backup(s)", backups.len());
        }

        BackupCommands::Info { backup } => {
            let path = resolve_backup_path(&manager, &backup)?;
            let validation = RestoreManager::new(storage).validate_backup(&path)?;
            let size = std::fs::metadata(&path)?.len();

            println!("Backup");
            println!("------");
            println!("File: {}", path.display());
            println!("Size: {}", human_size(size));
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!(
                "Written by: Cashiro {} (schema {})",
                validation.app_version, validation.schema_version
            );
            if let Some(name) = &validation.profile_name {
                println!("Profile: {}", name);
            }
            println!();
            println!("Contents:");
            println!("  Accounts:       {}", validation.counts.accounts);
            println!("  Categories:     {}", validation.counts.categories);
            println!("  Transactions:   {}", validation.counts.transactions);
            println!("  Subscriptions:  {}", validation.counts.subscriptions);
            println!("  Exchange rates: {}", validation.counts.exchange_rates);
            println!();
            println!("Status: {}", validation.summary());
            for problem in &validation.problems {
                println!("  - {}", problem);
            }
        }

        BackupCommands::Restore { backup, force } => {
            let path = resolve_backup_path(&manager, &backup)?;
            let restore = RestoreManager::new(storage);
            let validation = restore.validate_backup(&path)?;

            println!("Backup: {}", path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status: {}", validation.summary());
            println!();

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force:");
                println!("  cashiro backup restore {} --force", backup);
                return Ok(());
            }

            if settings.backup_before_restore {
                let safety = manager.create_backup(storage)?;
                println!("Saved current data to: {}", file_name(&safety));
            }

            let result = restore.restore_from_file(&path)?;
            println!("Restore complete.");
            println!("{}", result.summary());
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let (monthly, daily): (Vec<_>, Vec<_>) = backups.iter().partition(|b| b.is_monthly);
            let daily_excess = daily.len().saturating_sub(retention.daily_count as usize);
            let monthly_excess = monthly.len().saturating_sub(retention.monthly_count as usize);

            println!(
                "Retention policy: {} daily, {} monthly",
                retention.daily_count, retention.monthly_count
            );
            println!(
                "Current backups: {} daily, {} monthly",
                daily.len(),
                monthly.len()
            );

            if daily_excess + monthly_excess == 0 {
                println!("No backups to prune.");
                return Ok(());
            }
            if !force {
                println!(
                    "{} backup(s) would be deleted. Run again with --force to delete them.",
                    daily_excess + monthly_excess
                );
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }

        BackupCommands::Export { path } => {
            let archive = manager.export_to(storage, &path)?;
            println!("Backup written to: {}", path.display());
            println!(
                "  {} record(s) as of {}",
                archive.data.record_count(),
                archive.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    Ok(())
}

/// A path, a file name in the backup directory, or "latest"
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> CashiroResult<PathBuf> {
    let not_found = || CashiroError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    };

    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(not_found);
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let in_dir = manager.backup_dir().join(backup);
    if in_dir.exists() {
        return Ok(in_dir);
    }
    let with_ext = manager.backup_dir().join(format!("{}.json", backup));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(not_found())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Coarse age such as "42s", "3h" or "2mo"
fn format_age(age: chrono::Duration) -> String {
    let seconds = age.num_seconds().max(0);
    const STEPS: [(i64, &str); 4] = [
        (60 * 60 * 24 * 30, "mo"),
        (60 * 60 * 24, "d"),
        (60 * 60, "h"),
        (60, "m"),
    ];
    STEPS
        .iter()
        .find(|(unit, _)| seconds >= *unit)
        .map(|(unit, suffix)| format!("{}{}", seconds / unit, suffix))
        .unwrap_or_else(|| format!("{}s", seconds))
}

fn human_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1 << 20 => format!("{:.1} MB", b as f64 / (1u64 << 20) as f64),
        b if b >= 1 << 10 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{} B", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(42)), "42s");
        assert_eq!(format_age(Duration::minutes(90)), "1h");
        assert_eq!(format_age(Duration::days(45)), "1mo");
        assert_eq!(format_age(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}

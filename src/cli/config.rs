//! Settings CLI commands

use chrono::format::{Item, StrftimeItems};
use clap::Subcommand;

use crate::config::paths::CashiroPaths;
use crate::config::settings::Settings;
use crate::error::{CashiroError, CashiroResult};

/// Keys accepted by `config set`
pub const SETTING_KEYS: &[&str] = &[
    "reminder_days",
    "backup_before_restore",
    "compact_amounts",
    "date_format",
    "backup.daily",
    "backup.monthly",
];

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show settings and data locations
    Show,
    /// Change one setting
    Set {
        /// One of: reminder_days, backup_before_restore, compact_amounts,
        /// date_format, backup.daily, backup.monthly
        key: String,
        value: String,
    },
    /// Put every setting back to its default
    Reset,
}

pub fn handle_config_command(
    paths: &CashiroPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> CashiroResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Cashiro Configuration");
            println!("=====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  reminder_days:         {}", settings.reminder_days);
            println!("  backup_before_restore: {}", settings.backup_before_restore);
            println!("  compact_amounts:       {}", settings.compact_amounts);
            println!("  date_format:           {}", settings.date_format);
            println!(
                "  backup.daily:          {}",
                settings.backup_retention.daily_count
            );
            println!(
                "  backup.monthly:        {}",
                settings.backup_retention.monthly_count
            );
        }

        ConfigCommands::Set { key, value } => {
            apply_setting(settings, &key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value.trim());
        }

        ConfigCommands::Reset => {
            *settings = Settings::default();
            settings.save(paths)?;
            println!("Settings reset to defaults.");
        }
    }

    Ok(())
}

/// Parse `value` for `key` and store it in `settings`
pub fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> CashiroResult<()> {
    let value = value.trim();
    match key {
        "reminder_days" => settings.reminder_days = parse_number(key, value)?,
        "backup_before_restore" => settings.backup_before_restore = parse_flag(key, value)?,
        "compact_amounts" => settings.compact_amounts = parse_flag(key, value)?,
        "date_format" => {
            let invalid = value.is_empty()
                || StrftimeItems::new(value).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(CashiroError::Config(format!(
                    "'{}' is not a valid date format. Try something like %d/%m/%Y",
                    value
                )));
            }
            settings.date_format = value.to_string();
        }
        "backup.daily" => settings.backup_retention.daily_count = parse_number(key, value)?,
        "backup.monthly" => settings.backup_retention.monthly_count = parse_number(key, value)?,
        _ => {
            return Err(CashiroError::Config(format!(
                "Unknown setting '{}'. Known settings: {}",
                key,
                SETTING_KEYS.join(", ")
            )))
        }
    }
    Ok(())
}

fn parse_number(key: &str, value: &str) -> CashiroResult<u32> {
    value.parse().map_err(|_| {
        CashiroError::Config(format!("{} must be a whole number, got '{}'", key, value))
    })
}

fn parse_flag(key: &str, value: &str) -> CashiroResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CashiroError::Config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_settings() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, "reminder_days", "7").unwrap();
        apply_setting(&mut settings, "compact_amounts", "yes").unwrap();
        apply_setting(&mut settings, "backup.daily", " 5 ").unwrap();
        apply_setting(&mut settings, "date_format", "%d/%m/%Y").unwrap();

        assert_eq!(settings.reminder_days, 7);
        assert!(settings.compact_amounts);
        assert_eq!(settings.backup_retention.daily_count, 5);
        assert_eq!(settings.date_format, "%d/%m/%Y");
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, "reminder_days", "-1").is_err());
        assert!(apply_setting(&mut settings, "compact_amounts", "maybe").is_err());
        assert!(apply_setting(&mut settings, "date_format", "%Q").is_err());
        assert!(apply_setting(&mut settings, "colour", "blue").is_err());
        assert_eq!(settings.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_set_persists() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut settings = Settings::default();

        handle_config_command(
            &paths,
            &mut settings,
            ConfigCommands::Set {
                key: "backup.monthly".into(),
                value: "3".into(),
            },
        )
        .unwrap();

        let reloaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(reloaded.backup_retention.monthly_count, 3);
    }
}

//! CLI command handlers
//!
//! Each submodule pairs a clap `Subcommand` enum with a handler that turns the
//! parsed arguments into service calls and prints the result.

pub mod account;
pub mod backup;
pub mod category;
pub mod config;
pub mod currency;
pub mod export;
pub mod profile;
pub mod report;
pub mod subscription;
pub mod transaction;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate};
use rust_decimal::Decimal;

use crate::config::settings::Settings;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{CurrencyCode, Money};

pub use account::{handle_account_command, AccountCommands};
pub use backup::{handle_backup_command, BackupCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use currency::{handle_currency_command, CurrencyCommands};
pub use export::{handle_export_command, ExportCommands};
pub use profile::{handle_profile_command, ProfileCommands};
pub use report::{handle_report_command, ReportCommands};
pub use subscription::{handle_subscription_command, SubscriptionCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

pub(crate) fn create_output(path: &Path) -> CashiroResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        CashiroError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_money(input: &str) -> CashiroResult<Money> {
    Money::parse(input).map_err(|e| {
        CashiroError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '12.50' or '1,200'",
            input, e
        ))
    })
}

/// Amounts typed for transactions and subscriptions are magnitudes
pub(crate) fn parse_positive_money(input: &str) -> CashiroResult<Money> {
    let amount = parse_money(input)?;
    if !amount.is_positive() {
        return Err(CashiroError::Validation(format!(
            "Amount must be greater than zero, got '{}'",
            input
        )));
    }
    Ok(amount)
}

/// `today`, `yesterday`, `tomorrow`, ISO dates, or the configured date format
pub(crate) fn parse_date(input: &str, settings: &Settings) -> CashiroResult<NaiveDate> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "today" => return Ok(today()),
        "yesterday" => return Ok(today() - Duration::days(1)),
        "tomorrow" => return Ok(today() + Duration::days(1)),
        _ => {}
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, &settings.date_format))
        .map_err(|_| {
            CashiroError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD, 'today' or 'yesterday'",
                input
            ))
        })
}

pub(crate) fn parse_optional_date(
    input: Option<&str>,
    settings: &Settings,
) -> CashiroResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s, settings),
        None => Ok(today()),
    }
}

pub fn parse_currency(input: &str) -> CashiroResult<CurrencyCode> {
    CurrencyCode::parse(input).map_err(|e| CashiroError::Currency(e.to_string()))
}

pub(crate) fn parse_rate(input: &str) -> CashiroResult<Decimal> {
    Decimal::from_str(input.trim()).map_err(|_| {
        CashiroError::Validation(format!("Invalid exchange rate '{}'", input))
    })
}

/// Empty string means "clear"
pub(crate) fn optional_text(input: Option<String>) -> Option<Option<String>> {
    input.map(|s| {
        let trimmed = s.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

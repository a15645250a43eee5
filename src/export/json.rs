//! Full JSON export
//!
//! A machine-readable dump of everything Cashiro stores. Unlike a backup it
//! carries summary metadata and is not meant to be restored.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CashiroResult;
use crate::models::{Account, Category, CurrencyCode, Profile, Subscription, Transaction};
use crate::storage::Storage;

pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub profile: Profile,
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
    /// Units of the main currency per unit of each listed currency
    pub exchange_rates: BTreeMap<CurrencyCode, Decimal>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub account_count: usize,
    pub category_count: usize,
    pub transaction_count: usize,
    pub subscription_count: usize,
    pub earliest_transaction: Option<NaiveDate>,
    pub latest_transaction: Option<NaiveDate>,
}

impl FullExport {
    pub fn from_storage(storage: &Storage) -> CashiroResult<Self> {
        let snapshot = storage.snapshot()?;
        let (earliest_transaction, latest_transaction) = match snapshot.date_range() {
            Some((first, last)) => (Some(first), Some(last)),
            None => (None, None),
        };

        let metadata = ExportMetadata {
            account_count: snapshot.accounts.len(),
            category_count: snapshot.categories.len(),
            transaction_count: snapshot.transactions.len(),
            subscription_count: snapshot.subscriptions.len(),
            earliest_transaction,
            latest_transaction,
        };

        let mut transactions = snapshot.transactions;
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: snapshot.profile.unwrap_or_default(),
            accounts: snapshot.accounts,
            categories: snapshot.categories,
            transactions,
            subscriptions: snapshot.subscriptions,
            exchange_rates: snapshot.exchange_rates,
            metadata,
        })
    }
}

/// Write the full export to `writer`; returns what was written
pub fn export_full_json<W: Write>(
    storage: &Storage,
    mut writer: W,
    pretty: bool,
) -> CashiroResult<FullExport> {
    let export = FullExport::from_storage(storage)?;
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &export)?;
    } else {
        serde_json::to_writer(&mut writer, &export)?;
    }
    writeln!(writer)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{AccountType, Frequency, Money};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_export_empty() {
        let (_temp_dir, storage) = create_test_storage();
        let mut out = Vec::new();
        let export = export_full_json(&storage, &mut out, false).unwrap();

        assert_eq!(export.metadata.transaction_count, 0);
        assert!(export.metadata.earliest_transaction.is_none());

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["schema_version"], "1.0.0");
        assert_eq!(value["profile"]["main_currency"], "USD");
    }

    #[test]
    fn test_export_counts_and_dates() {
        let (_temp_dir, storage) = create_test_storage();
        let account = Account::new("Wallet", AccountType::Cash, CurrencyCode::USD);
        storage.accounts.upsert(account.clone()).unwrap();
        for (m, d) in [(3, 9), (1, 20), (2, 2)] {
            let date = NaiveDate::from_ymd_opt(2025, m, d).unwrap();
            storage
                .transactions
                .upsert(Transaction::expense(account.id, date, Money::from_cents(100)))
                .unwrap();
        }
        let start = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        storage
            .subscriptions
            .upsert(Subscription::new(
                "News",
                Money::from_cents(500),
                account.id,
                Frequency::Monthly,
                start,
            ))
            .unwrap();

        let mut out = Vec::new();
        let export = export_full_json(&storage, &mut out, true).unwrap();
        assert_eq!(export.metadata.account_count, 1);
        assert_eq!(export.metadata.transaction_count, 3);
        assert_eq!(export.metadata.subscription_count, 1);
        assert_eq!(
            export.metadata.earliest_transaction,
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
        assert_eq!(
            export.metadata.latest_transaction,
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
        assert_eq!(export.transactions[0].date.to_string(), "2025-01-20");

        let parsed: FullExport = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.metadata, export.metadata);
        assert!(String::from_utf8(out).unwrap().contains("\n  \"schema_version\""));
    }
}

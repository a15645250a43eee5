//! Backup validation and restore
//!
//! An archive is only restored after it parses, carries the Cashiro format
//! marker, has a schema version this build understands, and every reference
//! inside it points at a record that is also in the archive.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{CashiroError, CashiroResult};
use crate::models::CurrencyCode;
use crate::storage::{Snapshot, Storage};

use super::manager::{BackupArchive, BACKUP_FORMAT, BACKUP_SCHEMA_VERSION};

/// Record counts of an archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub accounts: usize,
    pub categories: usize,
    pub transactions: usize,
    pub subscriptions: usize,
    pub exchange_rates: usize,
}

impl RecordCounts {
    fn of(data: &Snapshot) -> Self {
        Self {
            accounts: data.accounts.len(),
            categories: data.categories.len(),
            transactions: data.transactions.len(),
            subscriptions: data.subscriptions.len(),
            exchange_rates: data.exchange_rates.len(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} accounts, {} categories, {} transactions, {} subscriptions, {} exchange rates",
            self.accounts, self.categories, self.transactions, self.subscriptions, self.exchange_rates
        )
    }
}

/// Result of checking a backup file
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub app_version: String,
    pub profile_name: Option<String>,
    pub counts: RecordCounts,
    /// Broken references and invalid records; empty when restorable
    pub problems: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!("Valid backup: {}", self.counts.summary())
        } else {
            format!("Invalid backup: {} problem(s)", self.problems.len())
        }
    }
}

/// Result of a restore
#[derive(Debug, Clone)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub counts: RecordCounts,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!("Restored {}", self.counts.summary())
    }
}

pub struct RestoreManager<'a> {
    storage: &'a Storage,
}

impl<'a> RestoreManager<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Parse and check a backup without touching current data
    pub fn validate_backup(&self, backup_path: &Path) -> CashiroResult<ValidationResult> {
        let archive = read_archive(backup_path)?;
        Ok(validate_archive(&archive))
    }

    /// Replace all current data with the contents of a backup
    ///
    /// Invalid archives are refused before anything is written.
    pub fn restore_from_file(&self, backup_path: &Path) -> CashiroResult<RestoreResult> {
        let archive = read_archive(backup_path)?;
        self.restore_from_archive(archive)
    }

    pub fn restore_from_archive(&self, archive: BackupArchive) -> CashiroResult<RestoreResult> {
        let validation = validate_archive(&archive);
        if !validation.is_valid() {
            for problem in &validation.problems {
                warn!(%problem, "backup problem");
            }
            return Err(CashiroError::Restore(format!(
                "backup has {} broken references or invalid records: {}",
                validation.problems.len(),
                validation.problems.join("; ")
            )));
        }

        self.storage.replace_all(archive.data)?;
        info!(
            backup_date = %archive.created_at,
            records = validation.counts.transactions,
            "restored backup"
        );

        Ok(RestoreResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            counts: validation.counts,
        })
    }
}

/// Read an archive, checking the format marker and schema version first so
/// a foreign JSON file gets a clear error instead of a missing-field one
pub fn read_archive(path: &Path) -> CashiroResult<BackupArchive> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CashiroError::Restore(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| CashiroError::Restore(format!("Failed to parse backup: {}", e)))?;

    let format = value.get("format").and_then(|f| f.as_str());
    if format != Some(BACKUP_FORMAT) {
        return Err(CashiroError::Restore(format!(
            "{} is not a Cashiro backup",
            path.display()
        )));
    }

    let version = value
        .get("schema_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    if version > u64::from(BACKUP_SCHEMA_VERSION) {
        return Err(CashiroError::Restore(format!(
            "backup schema version {} is newer than supported version {}",
            version, BACKUP_SCHEMA_VERSION
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| CashiroError::Restore(format!("Failed to read backup contents: {}", e)))
}

pub fn validate_archive(archive: &BackupArchive) -> ValidationResult {
    let data = &archive.data;
    let mut problems = Vec::new();

    let accounts: HashSet<_> = data.accounts.iter().map(|a| a.id).collect();
    let categories: HashSet<_> = data.categories.iter().map(|c| c.id).collect();
    let subscriptions: HashSet<_> = data.subscriptions.iter().map(|s| s.id).collect();

    if accounts.len() != data.accounts.len() {
        problems.push("duplicate account ids".to_string());
    }
    if categories.len() != data.categories.len() {
        problems.push("duplicate category ids".to_string());
    }
    if subscriptions.len() != data.subscriptions.len() {
        problems.push("duplicate subscription ids".to_string());
    }
    let transaction_ids: HashSet<_> = data.transactions.iter().map(|t| t.id).collect();
    if transaction_ids.len() != data.transactions.len() {
        problems.push("duplicate transaction ids".to_string());
    }

    let main = data
        .profile
        .as_ref()
        .map(|p| p.main_currency)
        .unwrap_or(CurrencyCode::USD);
    for (code, rate) in &data.exchange_rates {
        if *code == main {
            problems.push(format!("exchange rate listed for the main currency {}", code));
        }
        if *rate <= Decimal::ZERO {
            problems.push(format!("exchange rate for {} is not positive ({})", code, rate));
        }
    }

    for account in &data.accounts {
        if let Err(e) = account.validate() {
            problems.push(format!("account {}: {}", account.id, e));
        }
    }
    for category in &data.categories {
        if let Err(e) = category.validate() {
            problems.push(format!("category {}: {}", category.id, e));
        }
    }

    for txn in &data.transactions {
        if let Err(e) = txn.validate() {
            problems.push(format!("transaction {}: {}", txn.id, e));
        }
        if !accounts.contains(&txn.account_id) {
            problems.push(format!(
                "transaction {} references missing account {}",
                txn.id, txn.account_id
            ));
        }
        if let Some(to) = txn.to_account_id.filter(|to| !accounts.contains(to)) {
            problems.push(format!(
                "transaction {} references missing account {}",
                txn.id, to
            ));
        }
        if let Some(category) = txn.category_id.filter(|c| !categories.contains(c)) {
            problems.push(format!(
                "transaction {} references missing category {}",
                txn.id, category
            ));
        }
        if let Some(sub) = txn.subscription_id.filter(|s| !subscriptions.contains(s)) {
            problems.push(format!(
                "transaction {} references missing subscription {}",
                txn.id, sub
            ));
        }
    }

    for sub in &data.subscriptions {
        if let Err(e) = sub.validate() {
            problems.push(format!("subscription {}: {}", sub.id, e));
        }
        if !accounts.contains(&sub.account_id) {
            problems.push(format!(
                "subscription {} references missing account {}",
                sub.id, sub.account_id
            ));
        }
        if let Some(category) = sub.category_id.filter(|c| !categories.contains(c)) {
            problems.push(format!(
                "subscription {} references missing category {}",
                sub.id, category
            ));
        }
    }

    ValidationResult {
        schema_version: archive.schema_version,
        backup_date: archive.created_at,
        app_version: archive.app_version.clone(),
        profile_name: data.profile.as_ref().map(|p| p.name.clone()),
        counts: RecordCounts::of(data),
        problems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::config::paths::CashiroPaths;
    use crate::config::settings::BackupRetention;
    use crate::models::{
        Account, AccountType, Category, CategoryKind, CurrencyCode, Money, Profile, Transaction,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn populate(storage: &Storage) -> Transaction {
        storage.profile.set(Profile::new("Ana", CurrencyCode::EUR)).unwrap();
        let account = Account::new("Wallet", AccountType::Cash, CurrencyCode::EUR);
        let category = Category::new("Food", CategoryKind::Expense);
        storage.accounts.upsert(account.clone()).unwrap();
        storage.categories.upsert(category.clone()).unwrap();
        let txn = Transaction::expense(
            account.id,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            Money::from_cents(1_250),
        )
        .with_category(Some(category.id));
        storage.transactions.upsert(txn.clone()).unwrap();
        storage.save_all().unwrap();
        txn
    }

    #[test]
    fn test_round_trip_restore() {
        let (source_dir, source) = create_test_storage();
        let txn = populate(&source);
        let paths = CashiroPaths::with_base_dir(source_dir.path().to_path_buf());
        let backup = BackupManager::new(&paths, BackupRetention::default())
            .create_backup(&source)
            .unwrap();

        let (_target_dir, target) = create_test_storage();
        let restore = RestoreManager::new(&target);
        let validation = restore.validate_backup(&backup).unwrap();
        assert!(validation.is_valid());
        assert_eq!(validation.counts.transactions, 1);
        assert_eq!(validation.profile_name.as_deref(), Some("Ana"));

        let result = restore.restore_from_file(&backup).unwrap();
        assert_eq!(result.counts.accounts, 1);
        assert_eq!(target.transactions.get(txn.id).unwrap(), Some(txn));
        assert_eq!(target.main_currency().unwrap(), CurrencyCode::EUR);

        // survives a reload from disk
        target.load_all().unwrap();
        assert_eq!(target.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_non_json_file_rejected_with_tip() {
        let (temp_dir, storage) = create_test_storage();
        let path = temp_dir.path().join("photo.zip");
        fs::write(&path, b"PK\x03\x04 not json").unwrap();

        let err = RestoreManager::new(&storage)
            .restore_from_file(&path)
            .unwrap_err();
        assert!(matches!(err, CashiroError::Restore(_)));
        assert_eq!(
            err.user_tip(),
            Some("The selected file is not a Cashiro backup (expected a .json archive).")
        );
    }

    #[test]
    fn test_foreign_json_and_newer_schema_rejected() {
        let (temp_dir, storage) = create_test_storage();
        let restore = RestoreManager::new(&storage);

        let foreign = temp_dir.path().join("foreign.json");
        fs::write(&foreign, r#"{"accounts": []}"#).unwrap();
        let err = restore.validate_backup(&foreign).unwrap_err();
        assert!(err.to_string().contains("not a Cashiro backup"));
        assert!(err.user_tip().is_some());

        let newer = temp_dir.path().join("newer.json");
        fs::write(
            &newer,
            r#"{"format": "cashiro-backup", "schema_version": 99, "created_at": "2025-01-01T00:00:00Z", "data": {}}"#,
        )
        .unwrap();
        let err = restore.validate_backup(&newer).unwrap_err();
        assert_eq!(
            err.user_tip(),
            Some("Update Cashiro to restore backups made by newer versions.")
        );

        let missing = temp_dir.path().join("missing.json");
        let err = restore.validate_backup(&missing).unwrap_err();
        assert_eq!(
            err.user_tip(),
            Some("Check the backup path, or run 'cashiro backup list'.")
        );
    }

    #[test]
    fn test_broken_references_refused() {
        let (_dir, storage) = create_test_storage();
        let txn = populate(&storage);
        let mut snapshot = storage.snapshot().unwrap();
        snapshot.accounts.clear();

        let archive = BackupArchive::new(snapshot, Utc::now());
        let validation = validate_archive(&archive);
        assert!(!validation.is_valid());
        assert!(validation.problems[0].contains("missing account"));

        let err = RestoreManager::new(&storage)
            .restore_from_archive(archive)
            .unwrap_err();
        assert!(err.user_tip().unwrap().contains("inconsistent"));
        // nothing was replaced
        assert_eq!(storage.accounts.count().unwrap(), 1);
        assert!(storage.transactions.get(txn.id).unwrap().is_some());

        // Rates must be positive and never keyed on the main currency
        let mut snapshot = storage.snapshot().unwrap();
        let gbp = CurrencyCode::parse("GBP").unwrap();
        snapshot.exchange_rates.insert(gbp, Decimal::ZERO);
        snapshot.exchange_rates.insert(CurrencyCode::JPY, Decimal::from(-3));
        snapshot.exchange_rates.insert(CurrencyCode::EUR, Decimal::ONE);
        let problems = validate_archive(&BackupArchive::new(snapshot, Utc::now())).problems;
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("GBP is not positive")));
        assert!(problems.iter().any(|p| p.contains("JPY is not positive")));
        assert!(problems.iter().any(|p| p.contains("main currency EUR")));

        // Repeated ids would collapse into one record on load
        let mut snapshot = storage.snapshot().unwrap();
        let copy = snapshot.transactions[0].clone();
        snapshot.transactions.push(copy);
        let problems = validate_archive(&BackupArchive::new(snapshot, Utc::now())).problems;
        assert_eq!(problems, vec!["duplicate transaction ids".to_string()]);
    }

    #[test]
    fn test_duplicate_subscription_ids_refused() {
        use crate::models::{Frequency, Subscription};

        let (_dir, storage) = create_test_storage();
        populate(&storage);
        let mut snapshot = storage.snapshot().unwrap();
        let account = snapshot.accounts[0].id;
        let sub = Subscription::new(
            "Cloud",
            Money::from_cents(300),
            account,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        snapshot.subscriptions.push(sub.clone());
        snapshot.subscriptions.push(sub);

        let validation = validate_archive(&BackupArchive::new(snapshot, Utc::now()));
        assert_eq!(validation.problems, vec!["duplicate subscription ids".to_string()]);
        assert!(!validation.is_valid());
    }
}

//! Storage layer for Cashiro
//!
//! Each entity lives in its own pretty-printed JSON file under `data/`.
//! Repositories keep the records in memory behind an `RwLock`; every
//! mutation is followed by an atomic save of the affected file.

pub mod accounts;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod profile;
pub mod subscriptions;
pub mod transactions;

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use accounts::AccountRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use init::{initialize_storage, InitOptions, InitOutcome};
pub use profile::{ProfileRepository, RateRepository};
pub use subscriptions::SubscriptionRepository;
pub use transactions::TransactionRepository;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::CashiroPaths;
use crate::currency::ExchangeRates;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{Account, Category, CurrencyCode, Profile, Subscription, Transaction};

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, CashiroError> {
    lock.read()
        .map_err(|e| CashiroError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, CashiroError> {
    lock.write()
        .map_err(|e| CashiroError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Everything Cashiro stores, in one serializable value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub profile: Option<Profile>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub exchange_rates: BTreeMap<CurrencyCode, Decimal>,
}

impl Snapshot {
    pub fn record_count(&self) -> usize {
        self.accounts.len()
            + self.categories.len()
            + self.transactions.len()
            + self.subscriptions.len()
    }

    /// Earliest and latest transaction dates
    pub fn date_range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        let min = self.transactions.iter().map(|t| t.date).min();
        let max = self.transactions.iter().map(|t| t.date).max();
        min.zip(max)
    }
}

/// Entry point to all repositories
pub struct Storage {
    paths: CashiroPaths,
    audit: AuditLogger,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    pub subscriptions: SubscriptionRepository,
    pub profile: ProfileRepository,
    pub rates: RateRepository,
}

impl Storage {
    /// Create a storage handle; nothing is read until `load_all`
    pub fn new(paths: CashiroPaths) -> CashiroResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            subscriptions: SubscriptionRepository::new(paths.subscriptions_file()),
            profile: ProfileRepository::new(paths.profile_file()),
            rates: RateRepository::new(paths.rates_file()),
            paths,
        })
    }

    /// `new` followed by `load_all`
    pub fn open(paths: CashiroPaths) -> CashiroResult<Self> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &CashiroPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&self) -> CashiroResult<()> {
        self.accounts.load()?;
        self.transactions.load()?;
        self.categories.load()?;
        self.subscriptions.load()?;
        self.profile.load()?;
        self.rates.load()?;
        debug!(
            accounts = self.accounts.count()?,
            transactions = self.transactions.count()?,
            "loaded data"
        );
        Ok(())
    }

    pub fn save_all(&self) -> CashiroResult<()> {
        self.accounts.save()?;
        self.transactions.save()?;
        self.categories.save()?;
        self.subscriptions.save()?;
        self.profile.save()?;
        self.rates.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.profile_file().exists()
    }

    /// Rate table anchored on the profile's main currency
    pub fn exchange_rates(&self) -> CashiroResult<ExchangeRates> {
        Ok(ExchangeRates::from_table(
            self.profile.main_currency()?,
            self.rates.get_all()?,
        ))
    }

    pub fn main_currency(&self) -> CashiroResult<CurrencyCode> {
        self.profile.main_currency()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> CashiroResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> CashiroResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> CashiroResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Copy of all in-memory data
    pub fn snapshot(&self) -> CashiroResult<Snapshot> {
        let profile = if self.profile.is_set()? {
            Some(self.profile.get()?)
        } else {
            None
        };
        Ok(Snapshot {
            profile,
            accounts: self.accounts.get_all()?,
            categories: self.categories.get_all()?,
            transactions: self.transactions.get_all()?,
            subscriptions: self.subscriptions.get_all()?,
            exchange_rates: self.rates.get_all()?,
        })
    }

    /// Replace every repository with `snapshot` and write all files
    pub fn replace_all(&self, snapshot: Snapshot) -> CashiroResult<()> {
        let Snapshot {
            profile,
            accounts,
            categories,
            transactions,
            subscriptions,
            exchange_rates,
        } = snapshot;

        self.profile.set(profile.unwrap_or_default())?;
        self.accounts.replace_all(accounts)?;
        self.categories.replace_all(categories)?;
        self.transactions.replace_all(transactions)?;
        self.subscriptions.replace_all(subscriptions)?;
        self.rates.replace_all(exchange_rates)?;
        self.save_all()?;

        info!("replaced all data");
        Ok(())
    }
}

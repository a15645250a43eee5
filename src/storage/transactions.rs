//! Transaction repository backed by `transactions.json`
//!
//! Keeps two secondary indexes: account -> transactions (a transfer is listed
//! under both of its accounts) and category -> transactions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CashiroError;
use crate::models::{AccountId, CategoryId, SubscriptionId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

#[derive(Default)]
struct Indexed {
    by_id: HashMap<TransactionId, Transaction>,
    by_account: HashMap<AccountId, Vec<TransactionId>>,
    by_category: HashMap<CategoryId, Vec<TransactionId>>,
}

impl Indexed {
    fn insert(&mut self, txn: Transaction) {
        self.unindex(txn.id);
        self.by_account.entry(txn.account_id).or_default().push(txn.id);
        if let Some(to) = txn.to_account_id {
            self.by_account.entry(to).or_default().push(txn.id);
        }
        if let Some(category) = txn.category_id {
            self.by_category.entry(category).or_default().push(txn.id);
        }
        self.by_id.insert(txn.id, txn);
    }

    fn unindex(&mut self, id: TransactionId) -> Option<Transaction> {
        let old = self.by_id.remove(&id)?;
        for account in [Some(old.account_id), old.to_account_id].into_iter().flatten() {
            if let Some(ids) = self.by_account.get_mut(&account) {
                ids.retain(|&t| t != id);
            }
        }
        if let Some(category) = old.category_id {
            if let Some(ids) = self.by_category.get_mut(&category) {
                ids.retain(|&t| t != id);
            }
        }
        Some(old)
    }

    fn collect(&self, ids: Option<&Vec<TransactionId>>) -> Vec<Transaction> {
        let mut txns: Vec<_> = ids
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect();
        sort_newest_first(&mut txns);
        txns
    }
}

/// Date descending, most recently created first within a day
pub fn sort_newest_first(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
    });
}

pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<Indexed>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Indexed::default()),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let file_data: TransactionData = read_json(&self.path)?;
        self.replace_all(file_data.transactions)
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let file_data = TransactionData {
            transactions: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn replace_all(&self, transactions: Vec<Transaction>) -> Result<(), CashiroError> {
        let mut data = write_lock(&self.data)?;
        *data = Indexed::default();
        for txn in transactions {
            data.insert(txn);
        }
        Ok(())
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, CashiroError> {
        Ok(read_lock(&self.data)?.by_id.get(&id).cloned())
    }

    /// Every transaction, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, CashiroError> {
        let data = read_lock(&self.data)?;
        let mut txns: Vec<_> = data.by_id.values().cloned().collect();
        sort_newest_first(&mut txns);
        Ok(txns)
    }

    /// Transactions touching an account, including incoming transfers
    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, CashiroError> {
        let data = read_lock(&self.data)?;
        Ok(data.collect(data.by_account.get(&account_id)))
    }

    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Transaction>, CashiroError> {
        let data = read_lock(&self.data)?;
        Ok(data.collect(data.by_category.get(&category_id)))
    }

    pub fn get_by_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<Transaction>, CashiroError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.subscription_id == Some(subscription_id))
            .collect())
    }

    /// Transactions dated within `start..=end`
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, CashiroError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect())
    }

    pub fn upsert(&self, txn: Transaction) -> Result<(), CashiroError> {
        write_lock(&self.data)?.insert(txn);
        Ok(())
    }

    pub fn delete(&self, id: TransactionId) -> Result<bool, CashiroError> {
        Ok(write_lock(&self.data)?.unindex(id).is_some())
    }

    pub fn count(&self) -> Result<usize, CashiroError> {
        Ok(read_lock(&self.data)?.by_id.len())
    }

    /// Earliest and latest transaction dates
    pub fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, CashiroError> {
        let data = read_lock(&self.data)?;
        let min = data.by_id.values().map(|t| t.date).min();
        let max = data.by_id.values().map(|t| t.date).max();
        Ok(min.zip(max))
    }
}

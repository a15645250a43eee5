//! Account repository backed by `accounts.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CashiroError;
use crate::models::{Account, AccountId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let file_data: AccountData = read_json(&self.path)?;
        self.replace_all(file_data.accounts)
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let file_data = AccountData {
            accounts: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Swap the whole in-memory set (used by load and restore)
    pub fn replace_all(&self, accounts: Vec<Account>) -> Result<(), CashiroError> {
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(accounts.into_iter().map(|a| (a.id, a)));
        Ok(())
    }

    pub fn get(&self, id: AccountId) -> Result<Option<Account>, CashiroError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All accounts ordered by sort order, then name
    pub fn get_all(&self) -> Result<Vec<Account>, CashiroError> {
        let data = read_lock(&self.data)?;
        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(accounts)
    }

    pub fn get_active(&self) -> Result<Vec<Account>, CashiroError> {
        Ok(self.get_all()?.into_iter().filter(|a| !a.archived).collect())
    }

    /// Case-insensitive name lookup
    pub fn get_by_name(&self, name: &str) -> Result<Option<Account>, CashiroError> {
        let wanted = name.trim().to_lowercase();
        Ok(read_lock(&self.data)?
            .values()
            .find(|a| a.name.to_lowercase() == wanted)
            .cloned())
    }

    pub fn name_exists(&self, name: &str, exclude: Option<AccountId>) -> Result<bool, CashiroError> {
        let wanted = name.trim().to_lowercase();
        Ok(read_lock(&self.data)?
            .values()
            .any(|a| a.name.to_lowercase() == wanted && Some(a.id) != exclude))
    }

    pub fn upsert(&self, account: Account) -> Result<(), CashiroError> {
        write_lock(&self.data)?.insert(account.id, account);
        Ok(())
    }

    pub fn delete(&self, id: AccountId) -> Result<bool, CashiroError> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }

    pub fn exists(&self, id: AccountId) -> Result<bool, CashiroError> {
        Ok(read_lock(&self.data)?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, CashiroError> {
        Ok(read_lock(&self.data)?.len())
    }

    /// Next free sort position
    pub fn next_sort_order(&self) -> Result<i32, CashiroError> {
        Ok(read_lock(&self.data)?
            .values()
            .map(|a| a.sort_order + 1)
            .max()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, CurrencyCode};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AccountRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = AccountRepository::new(temp_dir.path().join("accounts.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_get_and_name_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let account = Account::new("Main Bank", AccountType::Bank, CurrencyCode::USD);
        let id = account.id;
        repo.upsert(account).unwrap();

        assert_eq!(repo.get(id).unwrap().unwrap().name, "Main Bank");
        assert_eq!(repo.get_by_name("main bank").unwrap().unwrap().id, id);
        assert!(repo.name_exists("MAIN BANK", None).unwrap());
        assert!(!repo.name_exists("main bank", Some(id)).unwrap());
    }

    #[test]
    fn test_sorted_and_active() {
        let (_temp_dir, repo) = create_test_repo();
        let mut b = Account::new("beta", AccountType::Cash, CurrencyCode::USD);
        b.sort_order = 1;
        let mut a = Account::new("Alpha", AccountType::Cash, CurrencyCode::USD);
        a.sort_order = 1;
        let mut first = Account::new("Zed", AccountType::Cash, CurrencyCode::USD);
        first.archive();

        repo.upsert(b).unwrap();
        repo.upsert(a).unwrap();
        repo.upsert(first).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Zed", "Alpha", "beta"]);
        assert_eq!(repo.get_active().unwrap().len(), 2);
        assert_eq!(repo.next_sort_order().unwrap(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let account = Account::new("Wallet", AccountType::Wallet, CurrencyCode::EUR);
        let id = account.id;
        repo.upsert(account).unwrap();
        repo.save().unwrap();

        let reloaded = AccountRepository::new(temp_dir.path().join("accounts.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.get(id).unwrap().unwrap().currency, CurrencyCode::EUR);

        assert!(reloaded.delete(id).unwrap());
        assert!(!reloaded.delete(id).unwrap());
    }
}

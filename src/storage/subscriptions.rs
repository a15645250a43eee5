//! Subscription repository backed by `subscriptions.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CashiroError;
use crate::models::{AccountId, CategoryId, Subscription, SubscriptionId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SubscriptionData {
    subscriptions: Vec<Subscription>,
}

pub struct SubscriptionRepository {
    path: PathBuf,
    data: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl SubscriptionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let file_data: SubscriptionData = read_json(&self.path)?;
        self.replace_all(file_data.subscriptions)
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let file_data = SubscriptionData {
            subscriptions: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn replace_all(&self, subscriptions: Vec<Subscription>) -> Result<(), CashiroError> {
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(subscriptions.into_iter().map(|s| (s.id, s)));
        Ok(())
    }

    pub fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, CashiroError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// Ordered by next due date, then name
    pub fn get_all(&self) -> Result<Vec<Subscription>, CashiroError> {
        let data = read_lock(&self.data)?;
        let mut subs: Vec<_> = data.values().cloned().collect();
        subs.sort_by(|a, b| {
            a.next_due()
                .cmp(&b.next_due())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(subs)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Subscription>, CashiroError> {
        let wanted = name.trim().to_lowercase();
        Ok(read_lock(&self.data)?
            .values()
            .find(|s| s.name.to_lowercase() == wanted)
            .cloned())
    }

    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Subscription>, CashiroError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|s| s.account_id == account_id)
            .collect())
    }

    pub fn get_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subscription>, CashiroError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|s| s.category_id == Some(category_id))
            .collect())
    }

    pub fn upsert(&self, subscription: Subscription) -> Result<(), CashiroError> {
        write_lock(&self.data)?.insert(subscription.id, subscription);
        Ok(())
    }

    pub fn delete(&self, id: SubscriptionId) -> Result<bool, CashiroError> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, CashiroError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sub(name: &str, account: AccountId, day: u32) -> Subscription {
        Subscription::new(
            name,
            Money::from_cents(999),
            account,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        )
    }

    #[test]
    fn test_ordered_by_next_due() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SubscriptionRepository::new(temp_dir.path().join("subscriptions.json"));
        let account = AccountId::new();
        repo.upsert(sub("Gym", account, 20)).unwrap();
        repo.upsert(sub("Music", account, 5)).unwrap();
        repo.upsert(sub("Cloud", AccountId::new(), 5)).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Cloud", "Music", "Gym"]);
        assert_eq!(repo.get_by_account(account).unwrap().len(), 2);
        assert!(repo.get_by_name("gym").unwrap().is_some());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("subscriptions.json");
        let repo = SubscriptionRepository::new(path.clone());
        let mut s = sub("Music", AccountId::new(), 1);
        s.advance();
        let id = s.id;
        repo.upsert(s).unwrap();
        repo.save().unwrap();

        let reloaded = SubscriptionRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(id).unwrap().unwrap().payments_made, 1);
        assert!(reloaded.delete(id).unwrap());
        assert_eq!(reloaded.count().unwrap(), 0);
    }
}

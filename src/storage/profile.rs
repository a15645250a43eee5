//! Profile and exchange-rate storage
//!
//! Both are single documents rather than collections: `profile.json` holds
//! the one profile, `rates.json` the rate table against the main currency.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CashiroError;
use crate::models::{CurrencyCode, Profile};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

pub struct ProfileRepository {
    path: PathBuf,
    data: RwLock<Option<Profile>>,
}

impl ProfileRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(None),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let stored: Option<Profile> = read_json(&self.path)?;
        *write_lock(&self.data)? = stored;
        Ok(())
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let profile = self.get()?;
        write_json_atomic(&self.path, &profile)
    }

    /// The stored profile, or the default one before `init`
    pub fn get(&self) -> Result<Profile, CashiroError> {
        Ok(read_lock(&self.data)?.clone().unwrap_or_default())
    }

    pub fn is_set(&self) -> Result<bool, CashiroError> {
        Ok(read_lock(&self.data)?.is_some())
    }

    pub fn set(&self, profile: Profile) -> Result<(), CashiroError> {
        *write_lock(&self.data)? = Some(profile);
        Ok(())
    }

    pub fn main_currency(&self) -> Result<CurrencyCode, CashiroError> {
        Ok(self.get()?.main_currency)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RateData {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

pub struct RateRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<CurrencyCode, Decimal>>,
}

impl RateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let file_data: RateData = read_json(&self.path)?;
        self.replace_all(file_data.rates)
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let file_data = RateData {
            rates: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get_all(&self) -> Result<BTreeMap<CurrencyCode, Decimal>, CashiroError> {
        Ok(read_lock(&self.data)?.clone())
    }

    pub fn replace_all(&self, rates: BTreeMap<CurrencyCode, Decimal>) -> Result<(), CashiroError> {
        *write_lock(&self.data)? = rates;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, CashiroError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn test_profile_defaults_until_set() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ProfileRepository::new(temp_dir.path().join("profile.json"));
        repo.load().unwrap();
        assert!(!repo.is_set().unwrap());
        assert_eq!(repo.get().unwrap().name, "Me");

        let mut profile = Profile::new("Ana", CurrencyCode::EUR);
        profile.email = Some("ana@example.com".into());
        repo.set(profile).unwrap();
        repo.save().unwrap();

        let reloaded = ProfileRepository::new(temp_dir.path().join("profile.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get().unwrap().name, "Ana");
        assert_eq!(reloaded.main_currency().unwrap(), CurrencyCode::EUR);
    }

    #[test]
    fn test_rates_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rates.json");
        let repo = RateRepository::new(path.clone());

        let mut table = BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("1.0825").unwrap());
        repo.replace_all(table).unwrap();
        repo.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"EUR\""));

        let reloaded = RateRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.get_all().unwrap()[&CurrencyCode::EUR],
            Decimal::from_str("1.0825").unwrap()
        );
    }
}

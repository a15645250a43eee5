//! Profile service

use tracing::info;

use crate::audit::EntityType;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{CurrencyCode, Profile};
use crate::storage::Storage;

pub struct ProfileService<'a> {
    storage: &'a Storage,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    /// `Some(None)` clears the email
    pub email: Option<Option<String>>,
}

impl<'a> ProfileService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> CashiroResult<Profile> {
        self.storage.profile.get()
    }

    pub fn update(&self, input: UpdateProfileInput) -> CashiroResult<Profile> {
        let before = self.storage.profile.get()?;
        let mut profile = before.clone();

        if let Some(name) = input.name {
            profile.name = name.trim().to_string();
        }
        if let Some(email) = input.email {
            profile.email = email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty());
        }

        profile
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;
        profile.touch();

        self.save(&before, &profile)?;
        Ok(profile)
    }

    /// Change the main currency and rebase the rate table onto it
    ///
    /// Fails with `MissingRate` when other rates exist but none for
    /// `currency`, since they could not be re-expressed.
    pub fn set_main_currency(&self, currency: CurrencyCode) -> CashiroResult<Profile> {
        let before = self.storage.profile.get()?;
        if before.main_currency == currency {
            return Ok(before);
        }

        let mut rates = self.storage.exchange_rates()?;
        rates.rebase(currency)?;

        let mut profile = before.clone();
        profile.main_currency = currency;
        profile.touch();

        self.storage.rates.replace_all(rates.into_table())?;
        self.storage.rates.save()?;
        self.save(&before, &profile)?;
        info!(from = %before.main_currency, to = %currency, "changed main currency");

        Ok(profile)
    }

    fn save(&self, before: &Profile, after: &Profile) -> CashiroResult<()> {
        self.storage.profile.set(after.clone())?;
        self.storage.profile.save()?;
        self.storage.log_update(
            EntityType::Profile,
            "profile",
            Some(after.name.clone()),
            before,
            after,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_update_name_and_email() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProfileService::new(&storage);

        let profile = service
            .update(UpdateProfileInput {
                name: Some("  Ana ".into()),
                email: Some(Some("ana@example.com".into())),
            })
            .unwrap();
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.email.as_deref(), Some("ana@example.com"));

        let err = service
            .update(UpdateProfileInput {
                email: Some(Some("not-an-email".into())),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());

        let cleared = service
            .update(UpdateProfileInput {
                email: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert!(cleared.email.is_none());
        assert!(storage.is_initialized());
    }

    #[test]
    fn test_set_main_currency_rebases_rates() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProfileService::new(&storage);

        let mut table = BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("2").unwrap());
        table.insert(CurrencyCode::JPY, Decimal::from_str("0.01").unwrap());
        storage.rates.replace_all(table).unwrap();

        let gbp = CurrencyCode::parse("GBP").unwrap();
        assert!(matches!(
            service.set_main_currency(gbp).unwrap_err(),
            CashiroError::MissingRate { .. }
        ));
        assert_eq!(service.get().unwrap().main_currency, CurrencyCode::USD);

        let profile = service.set_main_currency(CurrencyCode::EUR).unwrap();
        assert_eq!(profile.main_currency, CurrencyCode::EUR);

        let rates = storage.rates.get_all().unwrap();
        assert_eq!(rates[&CurrencyCode::USD], Decimal::from_str("0.5").unwrap());
        assert_eq!(rates[&CurrencyCode::JPY], Decimal::from_str("0.005").unwrap());
        assert!(!rates.contains_key(&CurrencyCode::EUR));
    }

    #[test]
    fn test_set_main_currency_without_rates() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProfileService::new(&storage);
        let profile = service.set_main_currency(CurrencyCode::JPY).unwrap();
        assert_eq!(profile.main_currency, CurrencyCode::JPY);
        assert_eq!(storage.main_currency().unwrap(), CurrencyCode::JPY);
    }
}

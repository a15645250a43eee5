//! Exchange-rate service
//!
//! Rates are stored against the main currency: `1 code = rate main`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::info;

use crate::audit::EntityType;
use crate::currency::ExchangeRates;
use crate::error::CashiroResult;
use crate::models::{CurrencyCode, Money};
use crate::storage::Storage;

pub struct RateService<'a> {
    storage: &'a Storage,
}

impl<'a> RateService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn rates(&self) -> CashiroResult<ExchangeRates> {
        self.storage.exchange_rates()
    }

    pub fn list(&self) -> CashiroResult<BTreeMap<CurrencyCode, Decimal>> {
        self.storage.rates.get_all()
    }

    /// Set a rate; returns the one it replaced
    pub fn set(&self, code: CurrencyCode, rate: Decimal) -> CashiroResult<Option<Decimal>> {
        let mut rates = self.storage.exchange_rates()?;
        let previous = rates.set_rate(code, rate)?;
        let stored = rates.rate_to_main(code)?;
        self.persist(rates)?;

        match previous {
            Some(old) => self.storage.log_update(
                EntityType::ExchangeRate,
                code.as_str(),
                None,
                &old,
                &stored,
            )?,
            None => {
                self.storage
                    .log_create(EntityType::ExchangeRate, code.as_str(), None, &stored)?
            }
        }
        info!(currency = %code, rate = %stored, "set exchange rate");

        Ok(previous)
    }

    pub fn remove(&self, code: CurrencyCode) -> CashiroResult<Decimal> {
        let mut rates = self.storage.exchange_rates()?;
        let removed = rates.remove_rate(code)?;
        self.persist(rates)?;
        self.storage
            .log_delete(EntityType::ExchangeRate, code.as_str(), None, &removed)?;
        Ok(removed)
    }

    pub fn convert(&self, amount: Money, from: CurrencyCode, to: CurrencyCode) -> CashiroResult<Money> {
        self.storage.exchange_rates()?.convert(amount, from, to)
    }

    fn persist(&self, rates: ExchangeRates) -> CashiroResult<()> {
        self.storage.rates.replace_all(rates.into_table())?;
        self.storage.rates.save()
    }
}

//! Exchange rates relative to the main currency
//!
//! Each entry reads "1 unit of `code` = `rate` units of the main currency".
//! Any pair converts through the main currency as a hub, so only one rate per
//! foreign currency is ever stored.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{CashiroError, CashiroResult};
use crate::models::{CurrencyCode, Money};

/// Rate table anchored on a main currency
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRates {
    main: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRates {
    pub fn new(main: CurrencyCode) -> Self {
        Self {
            main,
            rates: BTreeMap::new(),
        }
    }

    /// Build from a stored table; a stray entry for the main currency is dropped
    pub fn from_table(main: CurrencyCode, mut rates: BTreeMap<CurrencyCode, Decimal>) -> Self {
        rates.remove(&main);
        Self { main, rates }
    }

    pub fn main(&self) -> CurrencyCode {
        self.main
    }

    pub fn table(&self) -> &BTreeMap<CurrencyCode, Decimal> {
        &self.rates
    }

    pub fn into_table(self) -> BTreeMap<CurrencyCode, Decimal> {
        self.rates
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Value of one unit of `code` in the main currency
    pub fn rate_to_main(&self, code: CurrencyCode) -> CashiroResult<Decimal> {
        if code == self.main {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&code)
            .copied()
            .ok_or_else(|| CashiroError::MissingRate {
                from: code.to_string(),
                to: self.main.to_string(),
            })
    }

    /// Convert an amount between two currencies, rounding half away from zero
    pub fn convert(
        &self,
        amount: Money,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> CashiroResult<Money> {
        if from == to {
            return Ok(amount);
        }

        let missing = || CashiroError::MissingRate {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_rate = self.rate_to_main(from).map_err(|_| missing())?;
        let to_rate = self.rate_to_main(to).map_err(|_| missing())?;

        let value = amount
            .to_decimal()
            .checked_mul(from_rate)
            .and_then(|v| v.checked_div(to_rate))
            .ok_or_else(|| {
                CashiroError::Currency(format!("Conversion of {} {} overflowed", amount, from))
            })?;

        Money::from_decimal(value).ok_or_else(|| {
            CashiroError::Currency(format!("Converted amount {} is out of range", value))
        })
    }

    pub fn to_main(&self, amount: Money, from: CurrencyCode) -> CashiroResult<Money> {
        self.convert(amount, from, self.main)
    }

    /// Set or replace a rate; returns the previous one
    pub fn set_rate(&mut self, code: CurrencyCode, rate: Decimal) -> CashiroResult<Option<Decimal>> {
        if code == self.main {
            return Err(CashiroError::Currency(format!(
                "{} is the main currency; its rate is always 1",
                code
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(CashiroError::Validation(format!(
                "Exchange rate must be greater than zero (got {})",
                rate
            )));
        }
        Ok(self.rates.insert(code, rate.normalize()))
    }

    pub fn remove_rate(&mut self, code: CurrencyCode) -> CashiroResult<Decimal> {
        self.rates.remove(&code).ok_or_else(|| CashiroError::NotFound {
            entity_type: "Exchange rate",
            identifier: code.to_string(),
        })
    }

    /// Switch the main currency, re-expressing every rate against the new one
    ///
    /// The previous main currency keeps a rate (the reciprocal of the new
    /// main's old rate) so nothing that converted before stops converting.
    pub fn rebase(&mut self, new_main: CurrencyCode) -> CashiroResult<()> {
        if new_main == self.main {
            return Ok(());
        }
        if self.rates.is_empty() {
            self.main = new_main;
            return Ok(());
        }

        let pivot = self.rate_to_main(new_main)?;
        let mut rebased = BTreeMap::new();
        for (code, rate) in &self.rates {
            if *code == new_main {
                continue;
            }
            let value = rate.checked_div(pivot).ok_or_else(|| {
                CashiroError::Currency(format!("Cannot rebase rate for {}", code))
            })?;
            rebased.insert(*code, value.normalize());
        }
        let old_main = Decimal::ONE
            .checked_div(pivot)
            .ok_or_else(|| CashiroError::Currency("Cannot rebase main currency".into()))?;
        rebased.insert(self.main, old_main.normalize());

        self.main = new_main;
        self.rates = rebased;
        Ok(())
    }
}

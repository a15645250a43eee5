//! Reports module for Cashiro
//!
//! Read-only aggregations over the loaded data. Every amount in a report is
//! expressed in the profile's main currency unless a field says otherwise.

pub mod category;
pub mod net_worth;
pub mod period;
pub mod subscriptions;
pub mod summary;
pub mod trend;

use std::collections::HashMap;

pub use category::{CategoryReport, CategoryRow};
pub use net_worth::{NetWorthReport, NetWorthRow};
pub use period::{DateRange, ReportPeriod};
pub use subscriptions::{SubscriptionReport, SubscriptionRow};
pub use summary::SummaryReport;
pub use trend::{TrendBucket, TrendGranularity, TrendReport};

use crate::currency::ExchangeRates;
use crate::error::CashiroResult;
use crate::models::{AccountId, CurrencyCode, Money, Transaction};
use crate::storage::Storage;

/// Converts account amounts into the main currency
pub(crate) struct MainCurrency {
    rates: ExchangeRates,
    currencies: HashMap<AccountId, CurrencyCode>,
}

impl MainCurrency {
    pub(crate) fn load(storage: &Storage) -> CashiroResult<Self> {
        let currencies = storage
            .accounts
            .get_all()?
            .into_iter()
            .map(|a| (a.id, a.currency))
            .collect();
        Ok(Self {
            rates: storage.exchange_rates()?,
            currencies,
        })
    }

    pub(crate) fn code(&self) -> CurrencyCode {
        self.rates.main()
    }

    pub(crate) fn account_currency(&self, account_id: AccountId) -> CurrencyCode {
        self.currencies
            .get(&account_id)
            .copied()
            .unwrap_or_else(|| self.rates.main())
    }

    /// A transaction's amount, as seen from its source account
    pub(crate) fn amount(&self, txn: &Transaction) -> CashiroResult<Money> {
        self.convert(txn.amount, self.account_currency(txn.account_id))
    }

    pub(crate) fn convert(&self, amount: Money, from: CurrencyCode) -> CashiroResult<Money> {
        self.rates.to_main(amount, from)
    }
}

/// Share of `part` in `total`, in percent
pub(crate) fn percentage(part: Money, total: Money) -> f64 {
    if total.is_zero() {
        0.0
    } else {
        part.cents() as f64 / total.cents() as f64 * 100.0
    }
}

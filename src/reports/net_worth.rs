//! Net worth
//!
//! Every account's balance in its own currency and in the main currency.
//! Only non-archived accounts flagged `include_in_total` count toward the
//! totals.

use crate::currency::format_amount;
use crate::error::CashiroResult;
use crate::models::{AccountId, AccountType, CurrencyCode, Money};
use crate::services::AccountService;
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct NetWorthRow {
    pub account_id: AccountId,
    pub name: String,
    pub account_type: AccountType,
    pub currency: CurrencyCode,
    pub balance: Money,
    /// `None` when no exchange rate is known for an uncounted account
    pub main_balance: Option<Money>,
    pub counted: bool,
}

#[derive(Debug, Clone)]
pub struct NetWorthReport {
    pub currency: CurrencyCode,
    pub rows: Vec<NetWorthRow>,
    /// Sum of positive counted balances
    pub assets: Money,
    /// Sum of negative counted balances, as a positive amount
    pub liabilities: Money,
    pub net_worth: Money,
}

impl NetWorthReport {
    /// Fails with `MissingRate` if a counted account cannot be converted
    pub fn generate(storage: &Storage, include_archived: bool) -> CashiroResult<Self> {
        let rates = storage.exchange_rates()?;
        let summaries = AccountService::new(storage).list_with_balances(include_archived)?;

        let mut rows = Vec::with_capacity(summaries.len());
        let mut assets = Money::zero();
        let mut liabilities = Money::zero();

        for summary in summaries {
            let account = summary.account;
            let counted = account.counts_toward_total();
            let main_balance = if counted {
                let converted = rates.to_main(summary.balance, account.currency)?;
                if converted.is_negative() {
                    liabilities += converted.abs();
                } else {
                    assets += converted;
                }
                Some(converted)
            } else {
                summary.main_balance
            };

            rows.push(NetWorthRow {
                account_id: account.id,
                name: account.name,
                account_type: account.account_type,
                currency: account.currency,
                balance: summary.balance,
                main_balance,
                counted,
            });
        }

        Ok(Self {
            currency: rates.main(),
            rows,
            assets,
            liabilities,
            net_worth: assets - liabilities,
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str("Net Worth\n");
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:<12} {:>16} {:>16}\n",
            "Account",
            "Type",
            "Balance",
            format!("In {}", self.currency)
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            let marker = if row.counted { "" } else { " *" };
            output.push_str(&format!(
                "{:<24} {:<12} {:>16} {:>16}\n",
                format!("{}{}", row.name, marker),
                row.account_type.to_string(),
                format_amount(row.balance, row.currency),
                row.main_balance
                    .map(|m| format_amount(m, self.currency))
                    .unwrap_or_else(|| "n/a".to_string())
            ));
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<37} {:>34}\n",
            "Assets",
            format_amount(self.assets, self.currency)
        ));
        output.push_str(&format!(
            "{:<37} {:>34}\n",
            "Liabilities",
            format_amount(-self.liabilities, self.currency)
        ));
        output.push_str(&format!(
            "{:<37} {:>34}\n",
            "NET WORTH",
            format_amount(self.net_worth, self.currency)
        ));
        if self.rows.iter().any(|r| !r.counted) {
            output.push_str("\n* not included in totals\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::error::CashiroError;
    use crate::models::{Account, Transaction};
    use chrono::NaiveDate;
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
    fn test_net_worth_in_main_currency() {
        let (_temp_dir, storage) = create_test_storage();
        let checking = Account::with_opening_balance(
            "Checking",
            AccountType::Bank,
            CurrencyCode::USD,
            Money::from_cents(100_000),
        );
        let euro = Account::with_opening_balance(
            "Euro",
            AccountType::Savings,
            CurrencyCode::EUR,
            Money::from_cents(50_000),
        );
        let card = Account::new("Card", AccountType::Credit, CurrencyCode::USD);
        let mut hidden = Account::with_opening_balance(
            "Cash box",
            AccountType::Cash,
            CurrencyCode::parse("GBP").unwrap(),
            Money::from_cents(1_000),
        );
        hidden.include_in_total = false;
        for a in [&checking, &euro, &card, &hidden] {
            storage.accounts.upsert(a.clone()).unwrap();
        }
        storage
            .transactions
            .upsert(Transaction::expense(
                card.id,
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                Money::from_cents(30_000),
            ))
            .unwrap();

        // no EUR rate yet
        assert!(matches!(
            NetWorthReport::generate(&storage, false).unwrap_err(),
            CashiroError::MissingRate { .. }
        ));

        let mut table = BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("1.2").unwrap());
        storage.rates.replace_all(table).unwrap();

        let report = NetWorthReport::generate(&storage, false).unwrap();
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.assets.cents(), 160_000);
        assert_eq!(report.liabilities.cents(), 30_000);
        assert_eq!(report.net_worth.cents(), 130_000);

        let gbp_row = report.rows.iter().find(|r| r.name == "Cash box").unwrap();
        assert!(!gbp_row.counted);
        assert!(gbp_row.main_balance.is_none());

        let text = report.format_terminal();
        assert!(text.contains("$1,300.00"));
        assert!(text.contains("n/a"));
    }
}

//! Income / expense summary for a period
//!
//! Transfers only move money between the user's own accounts, so they are
//! left out of every total here.

use std::io::Write;

use crate::currency::format_amount;
use crate::error::CashiroResult;
use crate::models::{CurrencyCode, Money, TransactionKind};
use crate::storage::Storage;

use super::{percentage, DateRange, MainCurrency};

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub range: DateRange,
    pub currency: CurrencyCode,
    pub income: Money,
    pub expense: Money,
    /// Income minus expense
    pub net: Money,
    pub income_count: usize,
    pub expense_count: usize,
    /// Transfers in the period; not part of any total
    pub transfer_count: usize,
}

impl SummaryReport {
    pub fn generate(storage: &Storage, range: DateRange) -> CashiroResult<Self> {
        let main = MainCurrency::load(storage)?;
        let transactions = storage
            .transactions
            .get_by_date_range(range.start, range.end)?;

        let mut report = Self {
            range,
            currency: main.code(),
            income: Money::zero(),
            expense: Money::zero(),
            net: Money::zero(),
            income_count: 0,
            expense_count: 0,
            transfer_count: 0,
        };

        for txn in &transactions {
            match txn.kind {
                TransactionKind::Income => {
                    report.income += main.amount(txn)?;
                    report.income_count += 1;
                }
                TransactionKind::Expense => {
                    report.expense += main.amount(txn)?;
                    report.expense_count += 1;
                }
                TransactionKind::Transfer => report.transfer_count += 1,
            }
        }
        report.net = report.income - report.expense;

        Ok(report)
    }

    /// Share of income left over, in percent; `None` without income
    pub fn savings_rate(&self) -> Option<f64> {
        if self.income.is_positive() {
            Some(percentage(self.net, self.income))
        } else {
            None
        }
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Summary: {}\n", self.range));
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>18} {:>8}\n",
            "Income",
            format_amount(self.income, self.currency),
            self.income_count
        ));
        output.push_str(&format!(
            "{:<20} {:>18} {:>8}\n",
            "Expenses",
            format_amount(self.expense, self.currency),
            self.expense_count
        ));
        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>18}\n",
            "Net",
            format_amount(self.net, self.currency)
        ));
        if let Some(rate) = self.savings_rate() {
            output.push_str(&format!("{:<20} {:>17.1}%\n", "Savings rate", rate));
        }
        if self.transfer_count > 0 {
            output.push_str(&format!(
                "\n{} transfer(s) not counted\n",
                self.transfer_count
            ));
        }

        output
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> CashiroResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "Start Date",
            "End Date",
            "Currency",
            "Income",
            "Expense",
            "Net",
            "Income Count",
            "Expense Count",
        ])?;
        let (start, end) = if self.range.is_unbounded() {
            (String::new(), String::new())
        } else {
            (self.range.start.to_string(), self.range.end.to_string())
        };
        csv.write_record([
            start,
            end,
            self.currency.to_string(),
            self.income.to_string(),
            self.expense.to_string(),
            self.net.to_string(),
            self.income_count.to_string(),
            self.expense_count.to_string(),
        ])?;
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{Account, AccountType, Transaction};
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

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(date(1), date(31)).unwrap()
    }

    #[test]
    fn test_summary_excludes_transfers_and_converts() {
        let (_temp_dir, storage) = create_test_storage();
        let usd = Account::new("Checking", AccountType::Bank, CurrencyCode::USD);
        let eur = Account::new("Euro", AccountType::Bank, CurrencyCode::EUR);
        storage.accounts.upsert(usd.clone()).unwrap();
        storage.accounts.upsert(eur.clone()).unwrap();
        let mut table = BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("1.10").unwrap());
        storage.rates.replace_all(table).unwrap();

        let txns = [
            Transaction::income(usd.id, date(1), Money::from_cents(300_000)),
            Transaction::expense(usd.id, date(5), Money::from_cents(50_000)),
            Transaction::expense(eur.id, date(6), Money::from_cents(10_000)),
            Transaction::transfer(
                usd.id,
                eur.id,
                date(7),
                Money::from_cents(11_000),
                Money::from_cents(10_000),
            ),
            // outside the range
            Transaction::expense(
                usd.id,
                NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                Money::from_cents(999),
            ),
        ];
        for txn in txns {
            storage.transactions.upsert(txn).unwrap();
        }

        let report = SummaryReport::generate(&storage, january()).unwrap();
        assert_eq!(report.income.cents(), 300_000);
        assert_eq!(report.expense.cents(), 61_000);
        assert_eq!(report.net.cents(), 239_000);
        assert_eq!(report.expense_count, 2);
        assert_eq!(report.transfer_count, 1);
        assert!(report.format_terminal().contains("$2,390.00"));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Start Date,End Date,Currency"));
        assert!(text.contains("2025-01-01,2025-01-31,USD,3000.00,610.00,2390.00,1,2"));
    }

    #[test]
    fn test_empty_summary() {
        let (_temp_dir, storage) = create_test_storage();
        let report = SummaryReport::generate(&storage, january()).unwrap();
        assert!(report.net.is_zero());
        assert!(report.savings_rate().is_none());
    }
}

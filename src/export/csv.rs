//! CSV export
//!
//! Transactions and accounts in spreadsheet-friendly form. Amounts are plain
//! numbers at the currency's precision, without symbols or grouping.

use std::collections::HashMap;
use std::io::Write;

use crate::currency::format_plain;
use crate::error::CashiroResult;
use crate::models::{AccountId, CurrencyCode, TransactionKind};
use crate::services::{AccountService, TransactionFilter, TransactionService};
use crate::storage::Storage;

pub const TRANSACTION_HEADER: [&str; 10] = [
    "ID",
    "Date",
    "Kind",
    "Account",
    "Category",
    "Amount",
    "Currency",
    "Main Amount",
    "Main Currency",
    "Note",
];

/// Write the transactions matching `filter`; returns the number of rows
///
/// A transfer's category column names its destination account. The main
/// amount is left empty when no exchange rate is known.
pub fn export_transactions_csv<W: Write>(
    storage: &Storage,
    writer: W,
    filter: &TransactionFilter,
) -> CashiroResult<usize> {
    let rates = storage.exchange_rates()?;
    let main = rates.main();

    let accounts: HashMap<AccountId, (String, CurrencyCode)> = storage
        .accounts
        .get_all()?
        .into_iter()
        .map(|a| (a.id, (a.name, a.currency)))
        .collect();
    let categories: HashMap<_, _> = storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(TRANSACTION_HEADER)?;

    let transactions = TransactionService::new(storage).list(filter)?;
    for txn in &transactions {
        let (account_name, currency) = accounts
            .get(&txn.account_id)
            .cloned()
            .unwrap_or_else(|| ("Unknown".to_string(), main));

        let category = if txn.kind == TransactionKind::Transfer {
            let to = txn
                .to_account_id
                .and_then(|id| accounts.get(&id))
                .map(|(name, _)| name.as_str())
                .unwrap_or("Unknown");
            format!("Transfer to {}", to)
        } else {
            txn.category_id
                .and_then(|id| categories.get(&id).cloned())
                .unwrap_or_default()
        };

        let main_amount = rates
            .to_main(txn.amount, currency)
            .map(|m| format_plain(m, main))
            .unwrap_or_default();

        csv.write_record([
            txn.id.as_uuid().to_string(),
            txn.date.to_string(),
            txn.kind.to_string().to_lowercase(),
            account_name,
            category,
            format_plain(txn.amount, currency),
            currency.to_string(),
            main_amount,
            main.to_string(),
            txn.note.clone(),
        ])?;
    }

    csv.flush()?;
    Ok(transactions.len())
}

/// Write every account with its current balance; returns the number of rows
pub fn export_accounts_csv<W: Write>(storage: &Storage, writer: W) -> CashiroResult<usize> {
    let main = storage.main_currency()?;
    let summaries = AccountService::new(storage).list_with_balances(true)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "ID",
        "Name",
        "Type",
        "Currency",
        "Opening Balance",
        "Balance",
        "Main Balance",
        "Main Currency",
        "Included",
        "Archived",
    ])?;

    for summary in &summaries {
        let account = &summary.account;
        csv.write_record([
            account.id.as_uuid().to_string(),
            account.name.clone(),
            account.account_type.to_string(),
            account.currency.to_string(),
            format_plain(account.opening_balance, account.currency),
            format_plain(summary.balance, account.currency),
            summary
                .main_balance
                .map(|m| format_plain(m, main))
                .unwrap_or_default(),
            main.to_string(),
            account.include_in_total.to_string(),
            account.archived.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(summaries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{Account, AccountType, Category, CategoryKind, Money, Transaction};
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

    #[test]
    fn test_transactions_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let checking = Account::new("Checking", AccountType::Bank, CurrencyCode::USD);
        let yen = Account::new("Tokyo", AccountType::Cash, CurrencyCode::JPY);
        let food = Category::new("Food", CategoryKind::Expense);
        storage.accounts.upsert(checking.clone()).unwrap();
        storage.accounts.upsert(yen.clone()).unwrap();
        storage.categories.upsert(food.clone()).unwrap();

        let mut table = BTreeMap::new();
        table.insert(CurrencyCode::JPY, Decimal::from_str("0.0067").unwrap());
        storage.rates.replace_all(table).unwrap();

        storage
            .transactions
            .upsert(
                Transaction::expense(checking.id, date(2), Money::from_cents(1_250))
                    .with_category(Some(food.id))
                    .with_note("lunch, with \"friends\""),
            )
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(yen.id, date(3), Money::from_cents(150_000)))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::transfer(
                checking.id,
                yen.id,
                date(4),
                Money::from_cents(10_000),
                Money::from_cents(1_492_500),
            ))
            .unwrap();

        let mut out = Vec::new();
        let rows = export_transactions_csv(&storage, &mut out, &TransactionFilter::new()).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "ID,Date,Kind,Account,Category,Amount,Currency,Main Amount,Main Currency,Note"
        );
        // newest first
        assert!(lines[1].contains(",transfer,Checking,Transfer to Tokyo,100.00,USD,100.00,USD,"));
        assert!(lines[2].contains(",expense,Tokyo,,1500,JPY,10.05,USD,"));
        assert!(lines[3].ends_with("Food,12.50,USD,12.50,USD,\"lunch, with \"\"friends\"\"\""));

        let mut filtered = Vec::new();
        let filter = TransactionFilter::new().account(yen.id).kind(TransactionKind::Expense);
        assert_eq!(export_transactions_csv(&storage, &mut filtered, &filter).unwrap(), 1);
    }

    #[test]
    fn test_missing_rate_leaves_main_amount_empty() {
        let (_temp_dir, storage) = create_test_storage();
        let euro = Account::new("Euro", AccountType::Bank, CurrencyCode::EUR);
        storage.accounts.upsert(euro.clone()).unwrap();
        storage
            .transactions
            .upsert(Transaction::income(euro.id, date(1), Money::from_cents(500)))
            .unwrap();

        let mut out = Vec::new();
        export_transactions_csv(&storage, &mut out, &TransactionFilter::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",income,Euro,,5.00,EUR,,USD,"));
    }

    #[test]
    fn test_accounts_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let account = Account::with_opening_balance(
            "Wallet",
            AccountType::Cash,
            CurrencyCode::USD,
            Money::from_cents(4_000),
        );
        storage.accounts.upsert(account).unwrap();

        let mut out = Vec::new();
        assert_eq!(export_accounts_csv(&storage, &mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",Wallet,Cash,USD,40.00,40.00,40.00,USD,true,false"));
    }
}

//! Transaction register and detail view

use tabled::Tabled;

use crate::currency::format_amount;
use crate::models::{Transaction, TransactionKind};

use super::{render_table, truncate, NameLookup};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn category_cell(txn: &Transaction, names: &NameLookup) -> String {
    match (txn.kind, txn.to_account_id) {
        (TransactionKind::Transfer, Some(to)) => format!("→ {}", names.account(to)),
        _ => names.category(txn.category_id).to_string(),
    }
}

pub fn format_transaction_list(transactions: &[Transaction], names: &NameLookup) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows: Vec<_> = transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.to_string(),
            date: txn.date.to_string(),
            account: names.account(txn.account_id).to_string(),
            category: category_cell(txn, names),
            amount: format_amount(txn.signed_amount(), names.currency(txn.account_id)),
            note: truncate(&txn.note, 30),
        })
        .collect();

    let mut output = render_table(rows, &[4]);
    output.push('\n');
    output.push_str(&format!("{} transaction(s)\n", transactions.len()));
    output
}

pub fn format_transaction_details(txn: &Transaction, names: &NameLookup) -> String {
    let currency = names.currency(txn.account_id);
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Kind:     {}\n", txn.kind));
    output.push_str(&format!("  Date:     {}\n", txn.date));
    output.push_str(&format!("  Amount:   {}\n", format_amount(txn.amount, currency)));

    if let (TransactionKind::Transfer, Some(to)) = (txn.kind, txn.to_account_id) {
        output.push_str(&format!("  From:     {}\n", names.account(txn.account_id)));
        output.push_str(&format!("  To:       {}\n", names.account(to)));
        let to_currency = names.currency(to);
        if to_currency != currency {
            output.push_str(&format!(
                "  Received: {}\n",
                format_amount(txn.destination_amount(), to_currency)
            ));
        }
    } else {
        output.push_str(&format!("  Account:  {}\n", names.account(txn.account_id)));
        output.push_str(&format!("  Category: {}\n", names.category(txn.category_id)));
    }

    if !txn.note.is_empty() {
        output.push_str(&format!("  Note:     {}\n", txn.note));
    }
    if let Some(sub) = txn.subscription_id {
        output.push_str(&format!("  Subscription payment: {}\n", sub));
    }

    output.push_str(&format!(
        "  Created:  {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{Account, AccountType, Category, CategoryKind, CurrencyCode, Money};
    use crate::storage::Storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, Account, Account, Category) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let checking = Account::new("Checking", AccountType::Bank, CurrencyCode::USD);
        let euro = Account::new("Euro", AccountType::Bank, CurrencyCode::EUR);
        let food = Category::new("Groceries", CategoryKind::Expense);
        storage.accounts.upsert(checking.clone()).unwrap();
        storage.accounts.upsert(euro.clone()).unwrap();
        storage.categories.upsert(food.clone()).unwrap();
        (temp_dir, storage, checking, euro, food)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_format_transaction_list() {
        let (_temp_dir, storage, checking, euro, food) = setup();
        let names = NameLookup::load(&storage).unwrap();
        let txns = vec![
            Transaction::expense(checking.id, date(), Money::from_cents(5_000))
                .with_category(Some(food.id))
                .with_note("Weekly shop"),
            Transaction::transfer(
                checking.id,
                euro.id,
                date(),
                Money::from_cents(1_000),
                Money::from_cents(900),
            ),
        ];

        let output = format_transaction_list(&txns, &names);
        assert!(output.contains("2025-01-15"));
        assert!(output.contains("Groceries"));
        assert!(output.contains("-$50.00"));
        assert!(output.contains("→ Euro"));
        assert!(output.contains("2 transaction(s)"));
    }

    #[test]
    fn test_format_empty_list() {
        let output = format_transaction_list(&[], &NameLookup::default());
        assert!(output.contains("No transactions found"));
    }

    #[test]
    fn test_transfer_details_show_both_legs() {
        let (_temp_dir, storage, checking, euro, _food) = setup();
        let names = NameLookup::load(&storage).unwrap();
        let txn = Transaction::transfer(
            checking.id,
            euro.id,
            date(),
            Money::from_cents(1_000),
            Money::from_cents(900),
        )
        .with_note("top up");

        let output = format_transaction_details(&txn, &names);
        assert!(output.contains("From:     Checking"));
        assert!(output.contains("To:       Euro"));
        assert!(output.contains("Received: €9.00"));
        assert!(output.contains("Note:     top up"));
    }
}

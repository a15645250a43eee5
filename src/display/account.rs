//! Account tables and detail view

use tabled::Tabled;

use crate::currency::format_amount;
use crate::models::{CurrencyCode, Money};
use crate::services::AccountSummary;

use super::{render_table, yes_no};

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "In Main")]
    main_balance: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status(summary: &AccountSummary) -> String {
    if summary.account.archived {
        "Archived".into()
    } else if !summary.account.include_in_total {
        "Excluded".into()
    } else {
        String::new()
    }
}

/// Accounts with balances and a total over the counted ones
///
/// The total is in the main currency and skips accounts with no known rate.
pub fn format_account_list(summaries: &[AccountSummary], main: CurrencyCode) -> String {
    if summaries.is_empty() {
        return "No accounts found.\n\nCreate one with 'cashiro account create <NAME>'.\n".into();
    }

    let rows: Vec<_> = summaries
        .iter()
        .map(|s| AccountRow {
            id: s.account.id.to_string(),
            name: s.account.name.clone(),
            account_type: s.account.account_type.to_string(),
            balance: format_amount(s.balance, s.account.currency),
            main_balance: match s.main_balance {
                Some(m) if s.account.currency != main => format_amount(m, main),
                Some(_) => String::new(),
                None => "no rate".into(),
            },
            status: status(s),
        })
        .collect();

    let counted = summaries.iter().filter(|s| s.account.counts_toward_total());
    let total: Money = counted.clone().filter_map(|s| s.main_balance).sum();
    let unconverted = counted.filter(|s| s.main_balance.is_none()).count();

    let mut output = render_table(rows, &[3, 4]);
    output.push('\n');
    output.push_str(&format!("Total: {}\n", format_amount(total, main)));
    if unconverted > 0 {
        output.push_str(&format!(
            "({} account(s) left out: no exchange rate to {})\n",
            unconverted, main
        ));
    }
    output
}

pub fn format_account_details(summary: &AccountSummary, main: CurrencyCode) -> String {
    let account = &summary.account;
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:               {}\n", account.id));
    output.push_str(&format!("  Type:             {}\n", account.account_type));
    output.push_str(&format!("  Currency:         {}\n", account.currency));
    output.push_str(&format!(
        "  In Total:         {}\n",
        yes_no(account.include_in_total)
    ));
    output.push_str(&format!("  Archived:         {}\n", yes_no(account.archived)));
    output.push('\n');
    output.push_str(&format!(
        "  Opening Balance:  {}\n",
        format_amount(account.opening_balance, account.currency)
    ));
    output.push_str(&format!(
        "  Current Balance:  {}\n",
        format_amount(summary.balance, account.currency)
    ));
    if account.currency != main {
        let converted = summary
            .main_balance
            .map(|m| format_amount(m, main))
            .unwrap_or_else(|| format!("(no rate to {})", main));
        output.push_str(&format!("  In {}:           {}\n", main, converted));
    }
    output.push_str(&format!("  Transactions:     {}\n", summary.transaction_count));

    if !account.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", account.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        account.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        account.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType};

    fn summary(name: &str, currency: CurrencyCode, cents: i64, main: Option<i64>) -> AccountSummary {
        AccountSummary {
            account: Account::new(name, AccountType::Bank, currency),
            balance: Money::from_cents(cents),
            main_balance: main.map(Money::from_cents),
            transaction_count: 2,
        }
    }

    #[test]
    fn test_format_account_list() {
        let summaries = vec![
            summary("Checking", CurrencyCode::USD, 100_000, Some(100_000)),
            summary("Euro Savings", CurrencyCode::EUR, 50_000, Some(55_000)),
        ];
        let output = format_account_list(&summaries, CurrencyCode::USD);
        assert!(output.contains("Checking"));
        assert!(output.contains("Euro Savings"));
        assert!(output.contains("$550.00"));
        assert!(output.contains("Total: $1,550.00"));
        assert!(!output.contains("left out"));
    }

    #[test]
    fn test_missing_rate_is_reported() {
        let summaries = vec![
            summary("Checking", CurrencyCode::USD, 1_000, Some(1_000)),
            summary("Yen", CurrencyCode::JPY, 500_000, None),
        ];
        let output = format_account_list(&summaries, CurrencyCode::USD);
        assert!(output.contains("no rate"));
        assert!(output.contains("Total: $10.00"));
        assert!(output.contains("1 account(s) left out"));
    }

    #[test]
    fn test_format_empty_list() {
        let output = format_account_list(&[], CurrencyCode::USD);
        assert!(output.contains("No accounts found"));
    }

    #[test]
    fn test_format_account_details() {
        let output = format_account_details(
            &summary("Travel", CurrencyCode::EUR, 12_345, None),
            CurrencyCode::USD,
        );
        assert!(output.contains("Account: Travel"));
        assert!(output.contains("Currency:         EUR"));
        assert!(output.contains("(no rate to USD)"));
        assert!(output.contains("Transactions:     2"));
    }
}

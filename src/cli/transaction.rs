//! Transaction CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_list};
use crate::display::NameLookup;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{CategoryKind, TransactionKind};
use crate::reports::ReportPeriod;
use crate::services::{
    AccountService, CategoryService, CreateTransactionInput, TransactionFilter,
    TransactionService, TransactionSort, TransferInput, UpdateTransactionInput,
};
use crate::storage::Storage;

use super::{optional_text, parse_date, parse_optional_date, parse_positive_money, today};

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record income or an expense
    Add {
        /// Account name or ID
        account: String,
        /// Amount, always positive (e.g. "12.50")
        amount: String,
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD, "today", "yesterday"); defaults to today
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Move money between two accounts
    Transfer {
        /// Source account
        from: String,
        /// Destination account
        to: String,
        /// Amount taken from the source account
        amount: String,
        /// Amount received, when the currencies differ and the rate should not
        /// be used
        #[arg(long)]
        to_amount: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List transactions
    List {
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// income, expense or transfer
        #[arg(short, long)]
        kind: Option<String>,
        /// Period such as this-month, last-30-days, 2025-03 or 2025-01-01..2025-01-31
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        period: Option<String>,
        /// First date to include
        #[arg(long)]
        from: Option<String>,
        /// Last date to include
        #[arg(long)]
        to: Option<String>,
        /// Text to look for in notes and category names
        #[arg(short, long)]
        search: Option<String>,
        /// newest, oldest, largest or smallest
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Maximum rows to show (0 for all)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },
    /// Edit a transaction
    Edit {
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        /// Destination amount of a transfer
        #[arg(long)]
        to_amount: Option<String>,
        /// Category name or ID; an empty value clears it
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete a transaction
    Delete { id: String },
}

fn parse_kind(input: &str) -> CashiroResult<TransactionKind> {
    TransactionKind::parse(input).ok_or_else(|| {
        CashiroError::Validation(format!(
            "Invalid transaction kind: '{}'. Valid kinds: income, expense, transfer",
            input
        ))
    })
}

fn category_kind(kind: TransactionKind) -> Option<CategoryKind> {
    match kind {
        TransactionKind::Income => Some(CategoryKind::Income),
        TransactionKind::Expense => Some(CategoryKind::Expense),
        TransactionKind::Transfer => None,
    }
}

pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> CashiroResult<()> {
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);
    let categories = CategoryService::new(storage);

    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            kind,
            category,
            date,
            note,
        } => {
            let kind = parse_kind(&kind)?;
            let account = accounts.resolve(&account)?;
            let category_id = match category {
                Some(c) => Some(categories.resolve(&c, category_kind(kind))?.id),
                None => None,
            };

            let txn = service.create(CreateTransactionInput {
                kind,
                account_id: account.id,
                amount: parse_positive_money(&amount)?,
                category_id,
                date: parse_optional_date(date.as_deref(), settings)?,
                note: note.unwrap_or_default(),
            })?;

            let names = NameLookup::load(storage)?;
            println!("Recorded {}: {}", txn.kind.to_string().to_lowercase(), txn.id);
            print!("{}", format_transaction_details(&txn, &names));
        }

        TransactionCommands::Transfer {
            from,
            to,
            amount,
            to_amount,
            date,
            note,
        } => {
            let from = accounts.resolve(&from)?;
            let to = accounts.resolve(&to)?;
            let txn = service.transfer(TransferInput {
                from: from.id,
                to: to.id,
                amount: parse_positive_money(&amount)?,
                to_amount: to_amount.as_deref().map(parse_positive_money).transpose()?,
                date: parse_optional_date(date.as_deref(), settings)?,
                note: note.unwrap_or_default(),
            })?;

            let names = NameLookup::load(storage)?;
            println!("Recorded transfer: {}", txn.id);
            print!("{}", format_transaction_details(&txn, &names));
        }

        TransactionCommands::List {
            account,
            category,
            kind,
            period,
            from,
            to,
            search,
            sort,
            limit,
        } => {
            let mut filter = TransactionFilter::new();
            if let Some(a) = account {
                filter = filter.account(accounts.resolve(&a)?.id);
            }
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            if let Some(k) = kind {
                filter = filter.kind(k);
            }
            if let Some(c) = category {
                filter = filter.category(categories.resolve(&c, kind.and_then(category_kind))?.id);
            }
            if let Some(p) = period {
                let range = p.parse::<ReportPeriod>()?.date_range(today())?;
                filter = filter.date_range(range.start, range.end);
            } else if from.is_some() || to.is_some() {
                let start = from
                    .as_deref()
                    .map(|d| parse_date(d, settings))
                    .transpose()?
                    .unwrap_or(chrono::NaiveDate::MIN);
                let end = to
                    .as_deref()
                    .map(|d| parse_date(d, settings))
                    .transpose()?
                    .unwrap_or(chrono::NaiveDate::MAX);
                filter = filter.date_range(start, end);
            }
            if let Some(s) = search {
                filter = filter.search(s);
            }
            let sort = TransactionSort::parse(&sort).ok_or_else(|| {
                CashiroError::Validation(format!(
                    "Invalid sort '{}'. Use newest, oldest, largest or smallest",
                    sort
                ))
            })?;
            filter = filter.sort(sort);
            if limit > 0 {
                filter = filter.limit(limit);
            }

            let transactions = service.list(&filter)?;
            let names = NameLookup::load(storage)?;
            print!("{}", format_transaction_list(&transactions, &names));
        }

        TransactionCommands::Show { id } => {
            let txn = service.resolve(&id)?;
            let names = NameLookup::load(storage)?;
            print!("{}", format_transaction_details(&txn, &names));
        }

        TransactionCommands::Edit {
            id,
            amount,
            to_amount,
            category,
            date,
            note,
        } => {
            let txn = service.resolve(&id)?;
            let category_id = match optional_text(category) {
                Some(Some(c)) => Some(Some(categories.resolve(&c, category_kind(txn.kind))?.id)),
                Some(None) => Some(None),
                None => None,
            };
            let input = UpdateTransactionInput {
                amount: amount.as_deref().map(parse_positive_money).transpose()?,
                to_amount: to_amount.as_deref().map(parse_positive_money).transpose()?,
                category_id,
                date: date.as_deref().map(|d| parse_date(d, settings)).transpose()?,
                note,
            };
            if input.amount.is_none()
                && input.to_amount.is_none()
                && input.category_id.is_none()
                && input.date.is_none()
                && input.note.is_none()
            {
                println!("No changes specified. See 'cashiro transaction edit --help'.");
                return Ok(());
            }

            let updated = service.update(txn.id, input)?;
            println!("Updated transaction: {}", updated.id);
        }

        TransactionCommands::Delete { id } => {
            let txn = service.resolve(&id)?;
            let deleted = service.delete(txn.id)?;
            println!("Deleted transaction: {} ({})", deleted.id, deleted.date);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Income").unwrap(), TransactionKind::Income);
        assert!(parse_kind("refund").unwrap_err().is_validation());
    }

    #[test]
    fn test_category_kind_follows_transaction_kind() {
        assert_eq!(category_kind(TransactionKind::Expense), Some(CategoryKind::Expense));
        assert_eq!(category_kind(TransactionKind::Transfer), None);
    }
}

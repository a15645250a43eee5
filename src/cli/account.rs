//! Account CLI commands

use clap::Subcommand;

use crate::display::account::{format_account_details, format_account_list};
use crate::error::{CashiroError, CashiroResult};
use crate::models::{AccountType, Money};
use crate::services::{AccountService, CreateAccountInput, UpdateAccountInput};
use crate::storage::Storage;

use super::{parse_currency, parse_money};

const ACCOUNT_TYPES: &str = "cash, bank, savings, credit, investment, wallet, other";

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (cash, bank, savings, credit, investment, wallet, other)
        #[arg(short = 't', long = "type", default_value = "bank")]
        account_type: String,
        /// Currency code; defaults to the main currency
        #[arg(short, long)]
        currency: Option<String>,
        /// Opening balance (e.g. "1000.00"); debt on a credit account may be
        /// given as a positive number
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
        /// Leave this account out of totals and net worth
        #[arg(long)]
        exclude: bool,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List accounts with balances
    List {
        /// Include archived accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Edit an account
    Edit {
        /// Account name or ID
        account: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 't', long = "type")]
        account_type: Option<String>,
        /// Only possible while the account has no transactions
        #[arg(short, long)]
        currency: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        balance: Option<String>,
        /// Count this account in totals (true/false)
        #[arg(long)]
        include: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Archive an account
    Archive { account: String },
    /// Unarchive an account
    Unarchive { account: String },
    /// Delete an account
    Delete {
        account: String,
        /// Also delete its transactions and subscriptions
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_account_type(input: &str) -> CashiroResult<AccountType> {
    AccountType::parse(input).ok_or_else(|| {
        CashiroError::Validation(format!(
            "Invalid account type: '{}'. Valid types: {}",
            input, ACCOUNT_TYPES
        ))
    })
}

/// Liability balances are stored as negative numbers
fn opening_balance(input: &str, account_type: AccountType) -> CashiroResult<Money> {
    let balance = parse_money(input)?;
    if account_type.is_liability() && balance.is_positive() {
        Ok(-balance)
    } else {
        Ok(balance)
    }
}

pub fn handle_account_command(storage: &Storage, cmd: AccountCommands) -> CashiroResult<()> {
    let service = AccountService::new(storage);
    let main = storage.main_currency()?;

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            currency,
            balance,
            exclude,
            notes,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let mut input = CreateAccountInput::new(name, account_type);
            input.currency = currency.as_deref().map(parse_currency).transpose()?;
            input.opening_balance = opening_balance(&balance, account_type)?;
            input.include_in_total = !exclude;
            input.notes = notes.unwrap_or_default();

            let account = service.create(input)?;
            println!("Created account: {}", account.name);
            println!("  Type:     {}", account.account_type);
            println!("  Currency: {}", account.currency);
            println!(
                "  Opening:  {}",
                crate::currency::format_amount(account.opening_balance, account.currency)
            );
            println!("  ID:       {}", account.id);
        }

        AccountCommands::List { all } => {
            let summaries = service.list_with_balances(all)?;
            print!("{}", format_account_list(&summaries, main));
        }

        AccountCommands::Show { account } => {
            let found = service.resolve(&account)?;
            let summary = service.summary(&found)?;
            print!("{}", format_account_details(&summary, main));
        }

        AccountCommands::Edit {
            account,
            name,
            account_type,
            currency,
            balance,
            include,
            notes,
        } => {
            let found = service.resolve(&account)?;
            let account_type = account_type.as_deref().map(parse_account_type).transpose()?;
            let effective_type = account_type.unwrap_or(found.account_type);

            let input = UpdateAccountInput {
                name,
                account_type,
                currency: currency.as_deref().map(parse_currency).transpose()?,
                opening_balance: balance
                    .as_deref()
                    .map(|b| opening_balance(b, effective_type))
                    .transpose()?,
                include_in_total: include,
                notes,
            };
            if input.name.is_none()
                && input.account_type.is_none()
                && input.currency.is_none()
                && input.opening_balance.is_none()
                && input.include_in_total.is_none()
                && input.notes.is_none()
            {
                println!("No changes specified. See 'cashiro account edit --help'.");
                return Ok(());
            }

            let updated = service.update(found.id, input)?;
            println!("Updated account: {}", updated.name);
        }

        AccountCommands::Archive { account } => {
            let found = service.resolve(&account)?;
            let archived = service.archive(found.id)?;
            println!("Archived account: {}", archived.name);
        }

        AccountCommands::Unarchive { account } => {
            let found = service.resolve(&account)?;
            let restored = service.unarchive(found.id)?;
            println!("Unarchived account: {}", restored.name);
        }

        AccountCommands::Delete { account, force } => {
            let found = service.resolve(&account)?;
            let deletion = service.delete(found.id, force)?;
            println!("Deleted account: {}", deletion.account.name);
            if deletion.transactions_removed + deletion.subscriptions_removed > 0 {
                println!(
                    "  Also removed {} transaction(s) and {} subscription(s)",
                    deletion.transactions_removed, deletion.subscriptions_removed
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_balance_is_negated() {
        assert_eq!(
            opening_balance("250", AccountType::Credit).unwrap().cents(),
            -25_000
        );
        assert_eq!(
            opening_balance("-250", AccountType::Credit).unwrap().cents(),
            -25_000
        );
        assert_eq!(opening_balance("250", AccountType::Bank).unwrap().cents(), 25_000);
    }

    #[test]
    fn test_unknown_type_lists_choices() {
        let err = parse_account_type("checking-ish").unwrap_err();
        assert!(err.to_string().contains("wallet"));
    }
}

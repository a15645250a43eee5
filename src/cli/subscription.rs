//! Subscription CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::currency::format_amount;
use crate::display::subscription::{format_subscription_details, format_subscription_list};
use crate::display::NameLookup;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{CategoryKind, Frequency, SubscriptionStatus};
use crate::services::{
    AccountService, CategoryService, CreateSubscriptionInput, SubscriptionService,
    UpdateSubscriptionInput,
};
use crate::storage::Storage;

use super::{optional_text, parse_date, parse_optional_date, parse_positive_money, today};

#[derive(Subcommand)]
pub enum SubscriptionCommands {
    /// Add a recurring payment
    Add {
        name: String,
        /// Amount charged each time
        amount: String,
        /// Paying account name or ID
        #[arg(short, long)]
        account: String,
        /// weekly, monthly, quarterly or yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
        /// Expense category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// First due date; defaults to today
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List subscriptions by next due date
    List {
        /// overdue, due-soon, upcoming or paused
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show one subscription
    Show { subscription: String },
    /// Edit a subscription
    Edit {
        subscription: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        frequency: Option<String>,
        /// Category name or ID; an empty value clears it
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Record the current payment as an expense and move to the next due date
    Pay { subscription: String },
    /// Move to the next due date without recording a payment
    Skip { subscription: String },
    /// Stop reminders until resumed
    Pause { subscription: String },
    /// Resume a paused subscription
    Resume { subscription: String },
    /// Delete a subscription; its past payments are kept
    Delete { subscription: String },
    /// Payments due soon
    Upcoming {
        /// How many days ahead to look
        #[arg(short, long, default_value = "7")]
        days: u32,
    },
}

fn parse_frequency(input: &str) -> CashiroResult<Frequency> {
    Frequency::parse(input).ok_or_else(|| {
        CashiroError::Validation(format!(
            "Invalid frequency: '{}'. Use weekly, monthly, quarterly or yearly",
            input
        ))
    })
}

fn parse_status(input: &str) -> CashiroResult<SubscriptionStatus> {
    SubscriptionStatus::parse(input).ok_or_else(|| {
        CashiroError::Validation(format!(
            "Invalid status: '{}'. Use overdue, due-soon, upcoming or paused",
            input
        ))
    })
}

pub fn handle_subscription_command(
    storage: &Storage,
    settings: &Settings,
    cmd: SubscriptionCommands,
) -> CashiroResult<()> {
    let service = SubscriptionService::new(storage).with_reminder_days(settings.reminder_days);
    let accounts = AccountService::new(storage);
    let categories = CategoryService::new(storage);
    let today = today();

    match cmd {
        SubscriptionCommands::Add {
            name,
            amount,
            account,
            frequency,
            category,
            start,
            notes,
        } => {
            let account = accounts.resolve(&account)?;
            let category_id = match category {
                Some(c) => Some(categories.resolve(&c, Some(CategoryKind::Expense))?.id),
                None => None,
            };
            let sub = service.create(CreateSubscriptionInput {
                name,
                amount: parse_positive_money(&amount)?,
                account_id: account.id,
                category_id,
                frequency: parse_frequency(&frequency)?,
                start_date: parse_optional_date(start.as_deref(), settings)?,
                notes: notes.unwrap_or_default(),
            })?;
            println!("Created subscription: {} ({})", sub.name, sub.id);
            println!(
                "  {} {}, next due {}",
                format_amount(sub.amount, account.currency),
                sub.frequency.to_string().to_lowercase(),
                sub.next_due()
            );
        }

        SubscriptionCommands::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let subs = service.list(status, today)?;
            let names = NameLookup::load(storage)?;
            print!(
                "{}",
                format_subscription_list(&subs, &names, today, service.reminder_days())
            );
            if status.is_none() && !subs.is_empty() {
                let total = service.monthly_total()?;
                println!(
                    "\nActive monthly cost: {}",
                    format_amount(total, names.main_currency())
                );
            }
        }

        SubscriptionCommands::Show { subscription } => {
            let sub = service.resolve(&subscription)?;
            let names = NameLookup::load(storage)?;
            print!(
                "{}",
                format_subscription_details(&sub, &names, today, service.reminder_days())
            );
        }

        SubscriptionCommands::Edit {
            subscription,
            name,
            amount,
            account,
            frequency,
            category,
            start,
            notes,
        } => {
            let sub = service.resolve(&subscription)?;
            let category_id = match optional_text(category) {
                Some(Some(c)) => Some(Some(
                    categories.resolve(&c, Some(CategoryKind::Expense))?.id,
                )),
                Some(None) => Some(None),
                None => None,
            };
            let input = UpdateSubscriptionInput {
                name,
                amount: amount.as_deref().map(parse_positive_money).transpose()?,
                account_id: match account {
                    Some(a) => Some(accounts.resolve(&a)?.id),
                    None => None,
                },
                category_id,
                frequency: frequency.as_deref().map(parse_frequency).transpose()?,
                start_date: start.as_deref().map(|d| parse_date(d, settings)).transpose()?,
                notes,
            };
            if input.name.is_none()
                && input.amount.is_none()
                && input.account_id.is_none()
                && input.category_id.is_none()
                && input.frequency.is_none()
                && input.start_date.is_none()
                && input.notes.is_none()
            {
                println!("No changes specified. See 'cashiro subscription edit --help'.");
                return Ok(());
            }
            let updated = service.update(sub.id, input)?;
            println!("Updated subscription: {}", updated.name);
        }

        SubscriptionCommands::Pay { subscription } => {
            let sub = service.resolve(&subscription)?;
            let payment = service.mark_paid(sub.id)?;
            let names = NameLookup::load(storage)?;
            println!(
                "Paid {}: {} on {} (transaction {})",
                payment.subscription.name,
                format_amount(
                    payment.transaction.amount,
                    names.currency(payment.transaction.account_id)
                ),
                payment.transaction.date,
                payment.transaction.id
            );
            println!("  Next due: {}", payment.subscription.next_due());
        }

        SubscriptionCommands::Skip { subscription } => {
            let sub = service.resolve(&subscription)?;
            let (updated, skipped) = service.skip(sub.id)?;
            println!("Skipped {} due {}", updated.name, skipped);
            println!("  Next due: {}", updated.next_due());
        }

        SubscriptionCommands::Pause { subscription } => {
            let sub = service.resolve(&subscription)?;
            let paused = service.pause(sub.id)?;
            println!("Paused subscription: {}", paused.name);
        }

        SubscriptionCommands::Resume { subscription } => {
            let sub = service.resolve(&subscription)?;
            let resumed = service.resume(sub.id)?;
            println!("Resumed subscription: {}", resumed.name);
            println!("  Next due: {}", resumed.next_due());
        }

        SubscriptionCommands::Delete { subscription } => {
            let sub = service.resolve(&subscription)?;
            let deleted = service.delete(sub.id)?;
            println!("Deleted subscription: {}", deleted.name);
        }

        SubscriptionCommands::Upcoming { days } => {
            let overdue = service.overdue(today)?;
            let upcoming = service.upcoming(today, days)?;
            let names = NameLookup::load(storage)?;
            let reminder = service.reminder_days();

            if !overdue.is_empty() {
                println!("Overdue:");
                print!(
                    "{}",
                    format_subscription_list(&overdue, &names, today, reminder)
                );
                println!();
            }
            if upcoming.is_empty() {
                println!("Nothing due in the next {} day(s).", days);
            } else {
                println!("Due in the next {} day(s):", days);
                print!(
                    "{}",
                    format_subscription_list(&upcoming, &names, today, reminder)
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
    fn test_parse_frequency_and_status() {
        assert_eq!(parse_frequency("annual").unwrap(), Frequency::Yearly);
        assert!(parse_frequency("fortnightly").is_err());
        assert_eq!(parse_status("due_soon").unwrap(), SubscriptionStatus::DueSoon);
        assert!(parse_status("late").is_err());
    }
}

//! Profile CLI commands

use clap::Subcommand;

use crate::error::CashiroResult;
use crate::services::{AccountService, ProfileService, UpdateProfileInput};
use crate::storage::Storage;

use super::{optional_text, parse_currency};

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile
    Show,
    /// Change profile fields
    Set {
        #[arg(short, long)]
        name: Option<String>,
        /// Email address; an empty value clears it
        #[arg(short, long)]
        email: Option<String>,
        /// Main currency; existing exchange rates are re-expressed against it
        #[arg(short, long)]
        currency: Option<String>,
    },
}

pub fn handle_profile_command(storage: &Storage, cmd: ProfileCommands) -> CashiroResult<()> {
    let service = ProfileService::new(storage);

    match cmd {
        ProfileCommands::Show => {
            let profile = service.get()?;
            println!("Profile");
            println!("  Name:          {}", profile.name);
            println!(
                "  Email:         {}",
                profile.email.as_deref().unwrap_or("(none)")
            );
            println!("  Main currency: {}", profile.main_currency);
            match AccountService::new(storage).total_balance() {
                Ok(total) => println!(
                    "  Total balance: {}",
                    crate::currency::format_amount(total, profile.main_currency)
                ),
                Err(e) => println!("  Total balance: unavailable ({})", e),
            }
            println!(
                "  Since:         {}",
                profile.created_at.format("%Y-%m-%d")
            );
        }

        ProfileCommands::Set {
            name,
            email,
            currency,
        } => {
            if name.is_none() && email.is_none() && currency.is_none() {
                println!("No changes specified. Use --name, --email or --currency.");
                return Ok(());
            }

            // Parse before changing anything so a bad code leaves the profile untouched
            let currency = currency.as_deref().map(parse_currency).transpose()?;

            if name.is_some() || email.is_some() {
                let profile = service.update(UpdateProfileInput {
                    name,
                    email: optional_text(email),
                })?;
                println!("Updated profile: {}", profile.name);
            }
            if let Some(code) = currency {
                let profile = service.set_main_currency(code)?;
                println!("Main currency is now {}", profile.main_currency);
            }
        }
    }

    Ok(())
}

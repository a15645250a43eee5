//! Currency CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::currency::{format_amount, format_compact, format_trimmed};
use crate::display::currency::format_rate_list;
use crate::error::CashiroResult;
use crate::services::RateService;
use crate::storage::Storage;

use super::{parse_currency, parse_money, parse_rate};

#[derive(Subcommand)]
pub enum CurrencyCommands {
    /// Set the rate of a currency against the main currency
    RateSet {
        /// Currency code, e.g. EUR
        code: String,
        /// Units of the main currency per one unit of CODE
        rate: String,
    },
    /// Remove a rate
    RateRemove { code: String },
    /// List exchange rates
    Rates,
    /// Convert an amount between currencies
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency
        from: String,
        /// Target currency; defaults to the main currency
        to: Option<String>,
    },
    /// Show how an amount is displayed
    Format {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Currency code; defaults to the main currency
        code: Option<String>,
        /// Short form such as $1.2K
        #[arg(long, conflicts_with = "trimmed")]
        compact: bool,
        /// Drop a zero fraction
        #[arg(long)]
        trimmed: bool,
    },
}

pub fn handle_currency_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CurrencyCommands,
) -> CashiroResult<()> {
    let service = RateService::new(storage);
    let main = storage.main_currency()?;

    match cmd {
        CurrencyCommands::RateSet { code, rate } => {
            let code = parse_currency(&code)?;
            let rate = parse_rate(&rate)?;
            match service.set(code, rate)? {
                Some(old) => println!(
                    "Updated rate: 1 {} = {} {} (was {})",
                    code,
                    rate.normalize(),
                    main,
                    old.normalize()
                ),
                None => println!("Added rate: 1 {} = {} {}", code, rate.normalize(), main),
            }
        }

        CurrencyCommands::RateRemove { code } => {
            let code = parse_currency(&code)?;
            let removed = service.remove(code)?;
            println!("Removed rate for {} (was {})", code, removed.normalize());
        }

        CurrencyCommands::Rates => {
            print!("{}", format_rate_list(&service.rates()?));
        }

        CurrencyCommands::Convert { amount, from, to } => {
            let amount = parse_money(&amount)?;
            let from = parse_currency(&from)?;
            let to = match to {
                Some(code) => parse_currency(&code)?,
                None => main,
            };
            let converted = service.convert(amount, from, to)?;
            println!(
                "{} = {}",
                format_amount(amount, from),
                format_amount(converted, to)
            );
        }

        CurrencyCommands::Format {
            amount,
            code,
            compact,
            trimmed,
        } => {
            let amount = parse_money(&amount)?;
            let code = match code {
                Some(c) => parse_currency(&c)?,
                None => main,
            };
            let text = if compact || (settings.compact_amounts && !trimmed) {
                format_compact(amount, code)
            } else if trimmed {
                format_trimmed(amount, code)
            } else {
                format_amount(amount, code)
            };
            println!("{}", text);
        }
    }

    Ok(())
}

//! Export CLI commands
//!
//! Every export writes to standard output unless an output file is given.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::CashiroResult;
use crate::export::{export_accounts_csv, export_full_json, export_transactions_csv, FullExport};
use crate::reports::ReportPeriod;
use crate::services::{AccountService, TransactionFilter};
use crate::storage::Storage;

use super::{create_output, today};

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Transactions as CSV
    Transactions {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only this account (name or ID)
        #[arg(short, long)]
        account: Option<String>,
        /// Only this period, e.g. this-month or 2024-03
        #[arg(short, long)]
        period: Option<String>,
    },
    /// Accounts with their balances as CSV
    Accounts {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Everything as a single JSON document
    Json {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// One line instead of indented output
        #[arg(long)]
        compact: bool,
    },
    /// Show what a full export would contain
    Info,
}

fn open_writer(output: &Option<PathBuf>) -> CashiroResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(create_output(path)?),
        None => Box::new(io::stdout().lock()),
    })
}

pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> CashiroResult<()> {
    match cmd {
        ExportCommands::Transactions {
            output,
            account,
            period,
        } => {
            let mut filter = TransactionFilter::new();
            if let Some(a) = account {
                filter = filter.account(AccountService::new(storage).resolve(&a)?.id);
            }
            if let Some(p) = period {
                let range = p.parse::<ReportPeriod>()?.date_range(today())?;
                filter = filter.date_range(range.start, range.end);
            }

            let mut writer = open_writer(&output)?;
            let count = export_transactions_csv(storage, &mut writer, &filter)?;
            writer.flush()?;
            if let Some(path) = output {
                println!("Exported {} transaction(s) to: {}", count, path.display());
            }
        }

        ExportCommands::Accounts { output } => {
            let mut writer = open_writer(&output)?;
            let count = export_accounts_csv(storage, &mut writer)?;
            writer.flush()?;
            if let Some(path) = output {
                println!("Exported {} account(s) to: {}", count, path.display());
            }
        }

        ExportCommands::Json { output, compact } => {
            let mut writer = open_writer(&output)?;
            let export = export_full_json(storage, &mut writer, !compact)?;
            writer.flush()?;
            if let Some(path) = output {
                println!("Full export written to: {}", path.display());
                println!(
                    "  {} account(s), {} transaction(s), {} subscription(s)",
                    export.metadata.account_count,
                    export.metadata.transaction_count,
                    export.metadata.subscription_count
                );
            }
        }

        ExportCommands::Info => {
            let export = FullExport::from_storage(storage)?;
            let meta = &export.metadata;

            println!("Export Information");
            println!("==================");
            println!("Schema version: {}", export.schema_version);
            println!("Profile:        {}", export.profile.name);
            println!("Main currency:  {}", export.profile.main_currency);
            println!();
            println!("Accounts:       {}", meta.account_count);
            println!("Categories:     {}", meta.category_count);
            println!("Transactions:   {}", meta.transaction_count);
            println!("Subscriptions:  {}", meta.subscription_count);
            println!("Exchange rates: {}", export.exchange_rates.len());
            if let (Some(first), Some(last)) = (meta.earliest_transaction, meta.latest_transaction)
            {
                println!();
                println!("Transactions from {} to {}", first, last);
            }
        }
    }

    Ok(())
}

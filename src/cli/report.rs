//! Report CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{CashiroError, CashiroResult};
use crate::models::CategoryKind;
use crate::reports::{
    CategoryReport, DateRange, NetWorthReport, ReportPeriod, SubscriptionReport, SummaryReport,
    TrendGranularity, TrendReport,
};
use crate::storage::Storage;

use super::{create_output, today};

const PERIOD_HELP: &str =
    "today, this-week, this-month, last-month, last-30-days, this-year, all-time, YYYY-MM or START..END";

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Income, expenses and net for a period
    Summary {
        #[arg(short, long, default_value = "this-month", help = PERIOD_HELP)]
        period: String,
        /// Write CSV to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Totals per category
    Categories {
        #[arg(short, long, default_value = "this-month", help = PERIOD_HELP)]
        period: String,
        /// expense or income
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Show only the N largest categories
        #[arg(long)]
        top: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Income and expenses over time
    Trend {
        #[arg(short, long, default_value = "this-year", help = PERIOD_HELP)]
        period: String,
        /// day, week or month; chosen from the period length by default
        #[arg(short, long)]
        granularity: Option<String>,
    },
    /// Account balances and net worth
    #[command(alias = "networth")]
    NetWorth {
        /// Include archived accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Subscription costs and due dates
    Subscriptions,
}

fn range_for(period: &str) -> CashiroResult<DateRange> {
    period.parse::<ReportPeriod>()?.date_range(today())
}

pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> CashiroResult<()> {
    match cmd {
        ReportCommands::Summary { period, output } => {
            let report = SummaryReport::generate(storage, range_for(&period)?)?;
            match output {
                Some(path) => {
                    report.export_csv(create_output(&path)?)?;
                    println!("Summary exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Categories {
            period,
            kind,
            top,
            output,
        } => {
            let kind = CategoryKind::parse(&kind).ok_or_else(|| {
                CashiroError::Validation(format!(
                    "Invalid category kind: '{}'. Use income or expense",
                    kind
                ))
            })?;
            let mut report = CategoryReport::generate(storage, range_for(&period)?, kind)?;
            if let Some(n) = top {
                report.rows = report.top(n).to_vec();
            }
            match output {
                Some(path) => {
                    report.export_csv(create_output(&path)?)?;
                    println!("Category report exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Trend {
            period,
            granularity,
        } => {
            let granularity = granularity
                .as_deref()
                .map(str::parse::<TrendGranularity>)
                .transpose()?;
            let report = TrendReport::generate(storage, range_for(&period)?, granularity)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::NetWorth { all } => {
            let report = NetWorthReport::generate(storage, all)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Subscriptions => {
            let report = SubscriptionReport::generate(storage, today(), settings.reminder_days)?;
            print!("{}", report.format_terminal());
        }
    }

    Ok(())
}

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cashiro::cli::{
    handle_account_command, handle_backup_command, handle_category_command,
    handle_config_command, handle_currency_command, handle_export_command,
    handle_profile_command, handle_report_command, handle_subscription_command,
    handle_transaction_command, parse_currency,
};
use cashiro::config::{paths::CashiroPaths, settings::Settings};
use cashiro::display::format_history;
use cashiro::error::CashiroError;
use cashiro::storage::{initialize_storage, InitOptions, Storage};

#[derive(Parser)]
#[command(
    name = "cashiro",
    version,
    about = "Personal finance tracker for the terminal",
    long_about = "Cashiro keeps track of accounts, income, expenses and recurring \
                  subscriptions across currencies, with reports, backups and \
                  exports. Data lives in plain JSON files."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the data directory
    Init {
        /// Profile name
        #[arg(short, long, default_value = "Me")]
        name: String,
        /// Main currency
        #[arg(short, long, default_value = "USD")]
        currency: String,
        /// Start without the default categories
        #[arg(long)]
        no_categories: bool,
    },

    /// Show or change settings
    #[command(subcommand)]
    Config(cashiro::cli::ConfigCommands),

    /// Show recent changes
    History {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Profile and main currency
    #[command(subcommand)]
    Profile(cashiro::cli::ProfileCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(cashiro::cli::AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(cashiro::cli::CategoryCommands),

    /// Income, expenses and transfers
    #[command(subcommand, alias = "txn")]
    Transaction(cashiro::cli::TransactionCommands),

    /// Recurring payments
    #[command(subcommand, alias = "sub")]
    Subscription(cashiro::cli::SubscriptionCommands),

    /// Reports over a period
    #[command(subcommand)]
    Report(cashiro::cli::ReportCommands),

    /// Exchange rates and amount formatting
    #[command(subcommand)]
    Currency(cashiro::cli::CurrencyCommands),

    /// Create, inspect and restore backups
    #[command(subcommand)]
    Backup(cashiro::cli::BackupCommands),

    /// Write data as CSV or JSON
    #[command(subcommand)]
    Export(cashiro::cli::ExportCommands),
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CASHIRO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if let Some(tip) = err.downcast_ref::<CashiroError>().and_then(|e| e.user_tip()) {
                eprintln!("Tip: {}", tip);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = CashiroPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Cashiro - personal finance tracker");
            println!();
            println!("Run 'cashiro init' to get started.");
            println!("Run 'cashiro --help' for usage information.");
            return Ok(());
        }
    };

    // Commands that must work before or without loading the data files
    match command {
        Commands::Init {
            name,
            currency,
            no_categories,
        } => {
            let options = InitOptions {
                profile_name: name,
                main_currency: parse_currency(&currency)?,
                seed_categories: !no_categories,
            };
            println!("Initializing Cashiro at: {}", paths.base_dir().display());
            let outcome = initialize_storage(&paths, &options)?;
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            if outcome.created_profile {
                println!(
                    "Created profile '{}' with main currency {}",
                    options.profile_name, options.main_currency
                );
            } else {
                println!("A profile already exists; left it unchanged.");
            }
            if outcome.seeded_categories > 0 {
                println!("Added {} default categories.", outcome.seeded_categories);
            }
            println!();
            println!("Next: cashiro account create \"Checking\" --balance 0");
            return Ok(());
        }
        Commands::Config(cmd) => {
            handle_config_command(&paths, &mut settings, cmd)?;
            return Ok(());
        }
        command => dispatch(paths, settings, command),
    }
}

fn dispatch(paths: CashiroPaths, settings: Settings, command: Commands) -> Result<()> {
    let storage = Storage::open(paths)?;

    match command {
        Commands::History { limit } => {
            let entries = storage.audit().read_recent(limit)?;
            print!("{}", format_history(&entries));
        }
        Commands::Profile(cmd) => handle_profile_command(&storage, cmd)?,
        Commands::Account(cmd) => handle_account_command(&storage, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Subscription(cmd) => handle_subscription_command(&storage, &settings, cmd)?,
        Commands::Report(cmd) => handle_report_command(&storage, &settings, cmd)?,
        Commands::Currency(cmd) => handle_currency_command(&storage, &settings, cmd)?,
        Commands::Backup(cmd) => handle_backup_command(&storage, &settings, cmd)?,
        Commands::Export(cmd) => handle_export_command(&storage, cmd)?,
        Commands::Init { .. } | Commands::Config(_) => {}
    }

    Ok(())
}

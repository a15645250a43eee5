//! Cashiro - personal finance tracking for the terminal
//!
//! Accounts in any currency, income and expense transactions, transfers,
//! categories and recurring subscriptions, all stored as JSON files. Totals
//! are converted into the profile's main currency through a user-maintained
//! exchange-rate table.
//!
//! # Architecture
//!
//! - `config`: paths and user settings
//! - `error`: the `CashiroError` type
//! - `models`: records and value types (`Money`, `CurrencyCode`, ids)
//! - `storage`: JSON repositories and atomic file writes
//! - `currency`: amount formatting and exchange rates
//! - `services`: business rules on top of storage
//! - `reports`: period summaries, category breakdowns, trends, net worth
//! - `audit`: append-only change log
//! - `backup`: backup archives, retention and restore
//! - `export`: CSV and JSON export
//! - `display`: terminal tables and detail views
//! - `cli`: clap commands and their handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use cashiro::config::paths::CashiroPaths;
//! use cashiro::services::AccountService;
//! use cashiro::storage::Storage;
//!
//! let storage = Storage::open(CashiroPaths::new()?)?;
//! let total = AccountService::new(&storage).total_balance()?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod currency;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CashiroError, CashiroResult};

//! Data export
//!
//! - CSV: transactions and accounts, for spreadsheets
//! - JSON: the complete data set with summary metadata

pub mod csv;
pub mod json;

pub use self::csv::{export_accounts_csv, export_transactions_csv, TRANSACTION_HEADER};
pub use self::json::{export_full_json, ExportMetadata, FullExport, EXPORT_SCHEMA_VERSION};

//! Configuration module for Cashiro
//!
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::CashiroPaths;
pub use settings::{BackupRetention, Settings};

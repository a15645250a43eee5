//! Audit trail for Cashiro
//!
//! Every create, update and delete done through the services is appended to
//! `audit.log` as one JSON line with before/after snapshots.
//!
//! ```rust,ignore
//! use cashiro::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(
//!     EntityType::Account,
//!     account.id.to_string(),
//!     Some(account.name.clone()),
//!     &account,
//! ))?;
//! ```

mod entry;
mod logger;

pub use entry::{summarize_changes, AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;

//! Custom error types for Cashiro
//!
//! Every library operation returns `CashiroResult`. The binary turns these
//! into an `Error:` line plus an optional tip.

use thiserror::Error;

/// The main error type for Cashiro operations
#[derive(Error, Debug)]
pub enum CashiroError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entity is still referenced and cannot be removed
    #[error("{entity_type} '{identifier}' is still used by {references} record(s)")]
    InUse {
        entity_type: &'static str,
        identifier: String,
        references: usize,
    },

    /// Currency parsing and formatting errors
    #[error("Currency error: {0}")]
    Currency(String),

    /// No exchange rate to convert between two currencies
    #[error("No exchange rate available to convert {from} to {to}")]
    MissingRate { from: String, to: String },

    /// Backup creation errors
    #[error("Backup error: {0}")]
    Backup(String),

    /// Restore errors
    #[error("Failed to restore backup: {0}")]
    Restore(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CashiroError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for subscriptions
    pub fn subscription_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Subscription",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Pick a short hint to show next to the error message.
    ///
    /// Restore and backup failures mostly come from I/O or parse errors whose
    /// text is all we have, so the hint is chosen by looking at the message.
    pub fn user_tip(&self) -> Option<&'static str> {
        match self {
            Self::MissingRate { .. } => {
                Some("Add a rate with 'cashiro currency rate-set <CODE> <RATE>'.")
            }
            Self::InUse { .. } => {
                Some("Use --force to delete dependent records, or reassign them first.")
            }
            Self::Restore(msg) | Self::Backup(msg) => {
                let msg = msg.to_lowercase();
                if msg.contains("expected value")
                    || msg.contains("expected ident")
                    || msg.contains("not a cashiro backup")
                {
                    Some("The selected file is not a Cashiro backup (expected a .json archive).")
                } else if msg.contains("missing field") || msg.contains("unknown variant") {
                    Some("The backup is incomplete or was made by an incompatible version.")
                } else if msg.contains("newer") {
                    Some("Update Cashiro to restore backups made by newer versions.")
                } else if msg.contains("permission denied") {
                    Some("Check that Cashiro can read the backup file and write its data directory.")
                } else if msg.contains("no such file") || msg.contains("not found") {
                    Some("Check the backup path, or run 'cashiro backup list'.")
                } else if msg.contains("references") {
                    Some("The backup data is inconsistent; try an older backup.")
                } else {
                    None
                }
            }
            Self::Io(msg) if msg.to_lowercase().contains("permission denied") => {
                Some("Check the permissions of the Cashiro data directory.")
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for CashiroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CashiroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for CashiroError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for Cashiro operations
pub type CashiroResult<T> = Result<T, CashiroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CashiroError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = CashiroError::account_not_found("Wallet");
        assert_eq!(err.to_string(), "Account not found: Wallet");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_in_use_error() {
        let err = CashiroError::InUse {
            entity_type: "Category",
            identifier: "Groceries".into(),
            references: 4,
        };
        assert_eq!(
            err.to_string(),
            "Category 'Groceries' is still used by 4 record(s)"
        );
        assert!(err.user_tip().is_some());
    }

    #[test]
    fn test_restore_tip_for_garbage_file() {
        let err = CashiroError::Restore("expected value at line 1 column 1".into());
        assert_eq!(
            err.to_string(),
            "Failed to restore backup: expected value at line 1 column 1"
        );
        assert_eq!(
            err.user_tip(),
            Some("The selected file is not a Cashiro backup (expected a .json archive).")
        );
    }

    #[test]
    fn test_restore_tip_for_missing_field() {
        let err = CashiroError::Restore("missing field `data` at line 3".into());
        assert!(err.user_tip().unwrap().contains("incomplete"));
    }

    #[test]
    fn test_no_tip_for_plain_validation() {
        let err = CashiroError::Validation("name is empty".into());
        assert!(err.is_validation());
        assert!(err.user_tip().is_none());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CashiroError = io_err.into();
        assert!(matches!(err, CashiroError::Io(_)));
    }
}

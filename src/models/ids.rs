//! Strongly-typed ID wrappers for all entity types
//!
//! Each entity gets its own UUID newtype so an account id can never be passed
//! where a category id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short display prefix, e.g. `acc-`
            pub fn prefix() -> &'static str {
                $display_prefix
            }

            /// Check whether a user-typed identifier refers to this id
            ///
            /// Accepts the full UUID, the prefixed short form shown in tables
            /// (`acc-1a2b3c4d`) or the bare 8-character short form.
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim().to_lowercase();
                let full = self.0.to_string();
                if identifier == full {
                    return true;
                }
                let short = identifier
                    .strip_prefix($display_prefix)
                    .unwrap_or(&identifier);
                short.len() >= 8 && full.starts_with(short)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(AccountId, "acc-");
define_id!(TransactionId, "txn-");
define_id!(CategoryId, "cat-");
define_id!(SubscriptionId, "sub-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = AccountId::new();
        let display = id.to_string();
        assert!(display.starts_with("acc-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_parse_full_and_prefixed() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: SubscriptionId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: SubscriptionId = format!("sub-{}", uuid_str).parse().unwrap();
        assert_eq!(id, prefixed);
    }

    #[test]
    fn test_matches_short_form() {
        let id = TransactionId::new();
        let short = id.to_string();
        assert!(id.matches(&short));
        assert!(id.matches(&short[4..]));
        assert!(id.matches(&id.as_uuid().to_string()));
        assert!(!id.matches("txn-1234"));
        assert!(!TransactionId::new().matches(&short));
    }

    #[test]
    fn test_id_serialization_is_plain_uuid() {
        let id = CategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

//! Core data models for Cashiro
//!
//! Plain records for accounts, transactions, categories, subscriptions and
//! the user profile, plus the value types they are built from.

pub mod account;
pub mod category;
pub mod currency;
pub mod ids;
pub mod money;
pub mod profile;
pub mod subscription;
pub mod transaction;

pub use account::{Account, AccountType};
pub use category::{Category, CategoryKind, DEFAULT_CATEGORIES};
pub use currency::CurrencyCode;
pub use ids::{AccountId, CategoryId, SubscriptionId, TransactionId};
pub use money::Money;
pub use profile::Profile;
pub use subscription::{Frequency, Subscription, SubscriptionStatus};
pub use transaction::{Transaction, TransactionKind};

//! Service layer for Cashiro
//!
//! Services hold the business rules on top of the storage layer: validation,
//! referential integrity, derived balances and audit logging. Each borrows a
//! `Storage` and is cheap to construct per command.

pub mod account;
pub mod category;
pub mod profile;
pub mod rate;
pub mod subscription;
pub mod transaction;

pub use account::{AccountService, AccountSummary, CreateAccountInput, UpdateAccountInput};
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use profile::{ProfileService, UpdateProfileInput};
pub use rate::RateService;
pub use subscription::{
    CreateSubscriptionInput, SubscriptionPayment, SubscriptionService, UpdateSubscriptionInput,
};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, TransactionSort,
    TransferInput, UpdateTransactionInput,
};

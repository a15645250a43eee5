//! Transaction model
//!
//! A transaction is a dated movement of money: income into an account, an
//! expense out of it, or a transfer between two accounts. Amounts are always
//! stored as positive magnitudes; the kind decides the sign.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, SubscriptionId, TransactionId};
use super::money::Money;

/// Kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub kind: TransactionKind,

    /// Positive magnitude in the source account's currency
    pub amount: Money,

    /// Source account (the only account for income and expenses)
    pub account_id: AccountId,

    pub category_id: Option<CategoryId>,

    /// Destination account of a transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<AccountId>,

    /// Amount credited to the destination, in its currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<Money>,

    pub date: NaiveDate,

    #[serde(default)]
    pub note: String,

    /// Set when the transaction was recorded by paying a subscription
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<SubscriptionId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    fn base(kind: TransactionKind, account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            account_id,
            category_id: None,
            to_account_id: None,
            to_amount: None,
            date,
            note: String::new(),
            subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn income(account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        Self::base(TransactionKind::Income, account_id, date, amount)
    }

    pub fn expense(account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        Self::base(TransactionKind::Expense, account_id, date, amount)
    }

    /// Create a transfer; `to_amount` is what lands in the destination account
    pub fn transfer(
        from: AccountId,
        to: AccountId,
        date: NaiveDate,
        amount: Money,
        to_amount: Money,
    ) -> Self {
        let mut txn = Self::base(TransactionKind::Transfer, from, date, amount);
        txn.to_account_id = Some(to);
        txn.to_amount = Some(to_amount);
        txn
    }

    pub fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    /// Whether this transaction moves money in or out of `account_id`
    pub fn involves_account(&self, account_id: AccountId) -> bool {
        self.account_id == account_id || self.to_account_id == Some(account_id)
    }

    /// Amount credited to the destination of a transfer
    pub fn destination_amount(&self) -> Money {
        self.to_amount.unwrap_or(self.amount)
    }

    /// Signed effect of this transaction on the balance of `account_id`
    pub fn effect_on(&self, account_id: AccountId) -> Money {
        let mut effect = Money::zero();
        if self.account_id == account_id {
            effect += match self.kind {
                TransactionKind::Income => self.amount,
                TransactionKind::Expense | TransactionKind::Transfer => -self.amount,
            };
        }
        if self.is_transfer() && self.to_account_id == Some(account_id) {
            effect += self.destination_amount();
        }
        effect
    }

    /// Amount as displayed in lists: positive for income, negative otherwise
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense | TransactionKind::Transfer => -self.amount,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount);
        }
        if self.amount.exceeds_limit() || self.to_amount.is_some_and(|m| m.exceeds_limit()) {
            return Err(TransactionValidationError::AmountTooLarge);
        }

        match self.kind {
            TransactionKind::Transfer => {
                let to = self
                    .to_account_id
                    .ok_or(TransactionValidationError::MissingDestination)?;
                if to == self.account_id {
                    return Err(TransactionValidationError::SameAccountTransfer);
                }
                if self.category_id.is_some() {
                    return Err(TransactionValidationError::CategorizedTransfer);
                }
                if let Some(to_amount) = self.to_amount {
                    if !to_amount.is_positive() {
                        return Err(TransactionValidationError::NonPositiveAmount);
                    }
                }
            }
            TransactionKind::Income | TransactionKind::Expense => {
                if self.to_account_id.is_some() || self.to_amount.is_some() {
                    return Err(TransactionValidationError::UnexpectedDestination);
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.kind, self.amount)?;
        if !self.note.is_empty() {
            write!(f, " ({})", self.note)?;
        }
        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    AmountTooLarge,
    MissingDestination,
    SameAccountTransfer,
    CategorizedTransfer,
    UnexpectedDestination,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::AmountTooLarge => write!(f, "Amount may not exceed {}", Money::MAX),
            Self::MissingDestination => write!(f, "A transfer needs a destination account"),
            Self::SameAccountTransfer => {
                write!(f, "Cannot transfer from an account to itself")
            }
            Self::CategorizedTransfer => write!(f, "Transfers cannot have a category"),
            Self::UnexpectedDestination => {
                write!(f, "Only transfers can have a destination account")
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

//! Account model
//!
//! An account is a named container of money in a single currency: a wallet,
//! a bank account, a credit card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::CurrencyCode;
use super::ids::AccountId;
use super::money::Money;

/// Maximum length of an account name
pub const MAX_ACCOUNT_NAME_LEN: usize = 100;

/// Kind of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Cash,
    Bank,
    Savings,
    Credit,
    Investment,
    Wallet,
    Other,
}

impl AccountType {
    pub const ALL: [AccountType; 7] = [
        Self::Cash,
        Self::Bank,
        Self::Savings,
        Self::Credit,
        Self::Investment,
        Self::Wallet,
        Self::Other,
    ];

    /// Credit accounts normally carry a negative balance
    pub fn is_liability(&self) -> bool {
        matches!(self, Self::Credit)
    }

    /// Parse account type from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" | "checking" | "current" => Some(Self::Bank),
            "savings" | "saving" => Some(Self::Savings),
            "credit" | "credit_card" | "credit-card" | "card" => Some(Self::Credit),
            "investment" | "investments" => Some(Self::Investment),
            "wallet" | "e-wallet" | "ewallet" => Some(Self::Wallet),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::Savings => "Savings",
            Self::Credit => "Credit Card",
            Self::Investment => "Investment",
            Self::Wallet => "Wallet",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// A money account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Currency every amount on this account is expressed in
    pub currency: CurrencyCode,

    /// Balance the account had before the first recorded transaction
    pub opening_balance: Money,

    /// Whether the balance counts toward the total / net worth
    #[serde(default = "default_true")]
    pub include_in_total: bool,

    /// Archived accounts are hidden and reject new transactions
    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Account {
    /// Create a new account with a zero opening balance
    pub fn new(name: impl Into<String>, account_type: AccountType, currency: CurrencyCode) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into(),
            account_type,
            currency,
            opening_balance: Money::zero(),
            include_in_total: true,
            archived: false,
            notes: String::new(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account with an opening balance
    pub fn with_opening_balance(
        name: impl Into<String>,
        account_type: AccountType,
        currency: CurrencyCode,
        opening_balance: Money,
    ) -> Self {
        let mut account = Self::new(name, account_type, currency);
        account.opening_balance = opening_balance;
        account
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    /// Whether this account takes part in totals
    pub fn counts_toward_total(&self) -> bool {
        self.include_in_total && !self.archived
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > MAX_ACCOUNT_NAME_LEN {
            return Err(AccountValidationError::NameTooLong(len));
        }
        if self.opening_balance.exceeds_limit() {
            return Err(AccountValidationError::BalanceTooLarge);
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.account_type, self.currency)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    BalanceTooLarge,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Account name too long ({} chars, max {})",
                len, MAX_ACCOUNT_NAME_LEN
            ),
            Self::BalanceTooLarge => {
                write!(f, "Opening balance may not exceed {} in either direction", Money::MAX)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

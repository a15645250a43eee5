//! Subscription model
//!
//! A subscription is a recurring payment (streaming, rent, insurance). The
//! schedule is anchored on `start_date`; the n-th due date is always computed
//! from the anchor, never from the previous due date, so month-end clamping
//! cannot drift (Jan 31 -> Feb 28 -> Mar 31).

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, SubscriptionId};
use super::money::Money;

/// How often a subscription is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "quarterly" | "quarter" | "q" => Some(Self::Quarterly),
            "yearly" | "annual" | "annually" | "year" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// The `n`-th occurrence counted from `start` (occurrence 0 is `start`)
    pub fn occurrence(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Self::Weekly => start.checked_add_signed(Duration::weeks(i64::from(n))),
            Self::Monthly => start.checked_add_months(Months::new(n)),
            Self::Quarterly => start.checked_add_months(Months::new(n.checked_mul(3)?)),
            Self::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }

    /// Normalise a per-charge amount to a monthly cost
    pub fn monthly_cost(&self, amount: Money) -> Money {
        let value = amount.to_decimal();
        let monthly = match self {
            Self::Weekly => value * Decimal::from(52) / Decimal::from(12),
            Self::Monthly => value,
            Self::Quarterly => value / Decimal::from(3),
            Self::Yearly => value / Decimal::from(12),
        };
        Money::from_decimal(monthly).unwrap_or(amount)
    }

    /// Charges per year
    pub fn per_year(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 1,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Quarterly => write!(f, "Quarterly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

/// Where a subscription stands on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionStatus {
    Overdue,
    DueSoon,
    Upcoming,
    Paused,
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "overdue" => Some(Self::Overdue),
            "due-soon" | "soon" => Some(Self::DueSoon),
            "upcoming" => Some(Self::Upcoming),
            "paused" | "inactive" => Some(Self::Paused),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => write!(f, "Overdue"),
            Self::DueSoon => write!(f, "Due soon"),
            Self::Upcoming => write!(f, "Upcoming"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// A recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,

    pub name: String,

    /// Amount charged each period, in the account's currency
    pub amount: Money,

    /// Account the payment is taken from
    pub account_id: AccountId,

    pub category_id: Option<CategoryId>,

    pub frequency: Frequency,

    /// First due date; anchors the whole schedule
    pub start_date: NaiveDate,

    /// Occurrences already paid or skipped
    #[serde(default)]
    pub payments_made: u32,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub last_paid_on: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        account_id: AccountId,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriptionId::new(),
            name: name.into(),
            amount,
            account_id,
            category_id: None,
            frequency,
            start_date,
            payments_made: 0,
            active: true,
            notes: String::new(),
            last_paid_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Next unpaid due date
    pub fn next_due(&self) -> NaiveDate {
        self.frequency
            .occurrence(self.start_date, self.payments_made)
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn status(&self, today: NaiveDate, reminder_days: u32) -> SubscriptionStatus {
        if !self.active {
            return SubscriptionStatus::Paused;
        }
        let due = self.next_due();
        if due < today {
            SubscriptionStatus::Overdue
        } else if (due - today).num_days() <= i64::from(reminder_days) {
            SubscriptionStatus::DueSoon
        } else {
            SubscriptionStatus::Upcoming
        }
    }

    /// Days until the next due date (negative when overdue)
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.next_due() - today).num_days()
    }

    pub fn monthly_cost(&self) -> Money {
        self.frequency.monthly_cost(self.amount)
    }

    pub fn yearly_cost(&self) -> Money {
        self.amount.saturating_mul(i64::from(self.frequency.per_year()))
    }

    /// Move past the current occurrence; returns the date that was settled
    pub fn advance(&mut self) -> NaiveDate {
        let due = self.next_due();
        self.payments_made += 1;
        self.updated_at = Utc::now();
        due
    }

    pub fn pause(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn resume(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), SubscriptionValidationError> {
        if self.name.trim().is_empty() {
            return Err(SubscriptionValidationError::EmptyName);
        }
        let len = self.name.trim().chars().count();
        if len > 100 {
            return Err(SubscriptionValidationError::NameTooLong(len));
        }
        if !self.amount.is_positive() {
            return Err(SubscriptionValidationError::NonPositiveAmount);
        }
        if self.amount.exceeds_limit() {
            return Err(SubscriptionValidationError::AmountTooLarge);
        }
        Ok(())
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.amount, self.frequency)
    }
}

/// Validation errors for subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionValidationError {
    EmptyName,
    NameTooLong(usize),
    NonPositiveAmount,
    AmountTooLarge,
}

impl fmt::Display for SubscriptionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Subscription name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Subscription name too long ({} chars, max 100)", len)
            }
            Self::NonPositiveAmount => write!(f, "Subscription amount must be greater than zero"),
            Self::AmountTooLarge => {
                write!(f, "Subscription amount may not exceed {}", Money::MAX)
            }
        }
    }
}

impl std::error::Error for SubscriptionValidationError {}

//! Income and expense over time
//!
//! The range is cut into day, week (Monday-based) or month buckets. Buckets
//! with no activity are still present with zero totals.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::currency::{format_amount, format_compact};
use crate::error::{CashiroError, CashiroResult};
use crate::models::{CurrencyCode, Money, TransactionKind};
use crate::storage::Storage;

use super::{DateRange, MainCurrency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendGranularity {
    Day,
    Week,
    Month,
}

impl TrendGranularity {
    /// Days for up to a month, weeks up to half a year, months beyond
    pub fn auto(range: &DateRange) -> Self {
        match range.days() {
            d if d <= 31 => Self::Day,
            d if d <= 183 => Self::Week,
            _ => Self::Month,
        }
    }

    /// First day of the bucket holding `date`
    fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => start.succ_opt(),
            Self::Week => start.checked_add_signed(Duration::weeks(1)),
            Self::Month => start.checked_add_months(chrono::Months::new(1)),
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        match self {
            Self::Day => start.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = start.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => start.format("%Y-%m").to_string(),
        }
    }
}

impl FromStr for TrendGranularity {
    type Err = CashiroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(CashiroError::Validation(format!(
                "Unknown granularity '{}' (use day, week or month)",
                other
            ))),
        }
    }
}

impl fmt::Display for TrendGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendBucket {
    /// First day of the bucket, which may precede the report range
    pub start: NaiveDate,
    pub label: String,
    pub income: Money,
    pub expense: Money,
}

impl TrendBucket {
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Debug, Clone)]
pub struct TrendReport {
    /// The range actually covered; all-time is narrowed to the data
    pub range: DateRange,
    pub granularity: TrendGranularity,
    pub currency: CurrencyCode,
    /// Ascending by start date
    pub buckets: Vec<TrendBucket>,
}

impl TrendReport {
    /// Build the trend; `granularity` defaults to `TrendGranularity::auto`
    pub fn generate(
        storage: &Storage,
        range: DateRange,
        granularity: Option<TrendGranularity>,
    ) -> CashiroResult<Self> {
        let main = MainCurrency::load(storage)?;

        let range = if range.is_unbounded() {
            match storage.transactions.date_bounds()? {
                Some((first, last)) => range.clamp_to(first, last),
                None => {
                    return Ok(Self {
                        range,
                        granularity: granularity.unwrap_or(TrendGranularity::Month),
                        currency: main.code(),
                        buckets: Vec::new(),
                    })
                }
            }
        } else {
            range
        };
        let granularity = granularity.unwrap_or_else(|| TrendGranularity::auto(&range));

        let mut buckets = Vec::new();
        let mut cursor = Some(granularity.bucket_start(range.start));
        while let Some(start) = cursor.filter(|s| *s <= range.end) {
            buckets.push(TrendBucket {
                start,
                label: granularity.label(start),
                income: Money::zero(),
                expense: Money::zero(),
            });
            cursor = granularity.next(start);
        }

        for txn in storage
            .transactions
            .get_by_date_range(range.start, range.end)?
        {
            if txn.kind == TransactionKind::Transfer {
                continue;
            }
            let start = granularity.bucket_start(txn.date);
            let Ok(index) = buckets.binary_search_by(|b| b.start.cmp(&start)) else {
                continue;
            };
            let amount = main.amount(&txn)?;
            match txn.kind {
                TransactionKind::Income => buckets[index].income += amount,
                _ => buckets[index].expense += amount,
            }
        }

        Ok(Self {
            range,
            granularity,
            currency: main.code(),
            buckets,
        })
    }

    pub fn total_income(&self) -> Money {
        self.buckets.iter().map(|b| b.income).sum()
    }

    pub fn total_expense(&self) -> Money {
        self.buckets.iter().map(|b| b.expense).sum()
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Trend by {}: {}\n",
            self.granularity, self.range
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');

        if self.buckets.is_empty() {
            output.push_str("No transactions yet.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<12} {:>16} {:>16} {:>16}\n",
            "Period", "Income", "Expenses", "Net"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');
        for bucket in &self.buckets {
            output.push_str(&format!(
                "{:<12} {:>16} {:>16} {:>16}\n",
                bucket.label,
                format_compact(bucket.income, self.currency),
                format_compact(bucket.expense, self.currency),
                format_compact(bucket.net(), self.currency)
            ));
        }
        output.push_str(&"-".repeat(64));
        output.push('\n');
        let income = self.total_income();
        let expense = self.total_expense();
        output.push_str(&format!(
            "{:<12} {:>16} {:>16} {:>16}\n",
            "Total",
            format_amount(income, self.currency),
            format_amount(expense, self.currency),
            format_amount(income - expense, self.currency)
        ));

        output
    }
}

//! Report periods
//!
//! A `ReportPeriod` is a named window relative to "today" (or an explicit
//! pair of dates); `date_range` pins it down to an inclusive `DateRange`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{CashiroError, CashiroResult};

/// Inclusive span of days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CashiroResult<Self> {
        if start > end {
            return Err(CashiroError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Every date there is; used for all-time reports
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == NaiveDate::MIN && self.end == NaiveDate::MAX
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Narrow an unbounded range to the given data bounds
    pub fn clamp_to(&self, first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: self.start.max(first),
            end: self.end.min(last),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "all time")
        } else if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    Today,
    /// Monday through Sunday
    ThisWeek,
    #[default]
    ThisMonth,
    LastMonth,
    /// Today and the 29 days before it
    Last30Days,
    ThisYear,
    AllTime,
    Custom {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl ReportPeriod {
    pub fn date_range(&self, today: NaiveDate) -> CashiroResult<DateRange> {
        match *self {
            Self::Today => DateRange::new(today, today),
            Self::ThisWeek => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                DateRange::new(monday, monday + Duration::days(6))
            }
            Self::ThisMonth => {
                let start = first_of_month(today.year(), today.month())?;
                DateRange::new(start, last_of_month(start)?)
            }
            Self::LastMonth => {
                let this_month = first_of_month(today.year(), today.month())?;
                let end = this_month - Duration::days(1);
                DateRange::new(first_of_month(end.year(), end.month())?, end)
            }
            Self::Last30Days => DateRange::new(today - Duration::days(29), today),
            Self::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1);
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31);
                match start.zip(end) {
                    Some((start, end)) => DateRange::new(start, end),
                    None => Err(CashiroError::Validation(format!(
                        "Year {} is out of range",
                        today.year()
                    ))),
                }
            }
            Self::AllTime => Ok(DateRange::unbounded()),
            Self::Custom { start, end } => DateRange::new(start, end),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> CashiroResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CashiroError::Validation(format!("Invalid month {}-{:02}", year, month)))
}

fn last_of_month(first: NaiveDate) -> CashiroResult<NaiveDate> {
    let next = if first.month() == 12 {
        first_of_month(first.year() + 1, 1)?
    } else {
        first_of_month(first.year(), first.month() + 1)?
    };
    Ok(next - Duration::days(1))
}

fn parse_date(s: &str) -> CashiroResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        CashiroError::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", s.trim()))
    })
}

impl FromStr for ReportPeriod {
    type Err = CashiroError;

    /// Accepts a period name, `YYYY-MM`, or `START..END`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((start, end)) = s.split_once("..") {
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            DateRange::new(start, end)?;
            return Ok(Self::Custom { start, end });
        }

        match s.to_lowercase().replace('_', "-").as_str() {
            "today" => return Ok(Self::Today),
            "this-week" | "week" => return Ok(Self::ThisWeek),
            "this-month" | "month" => return Ok(Self::ThisMonth),
            "last-month" => return Ok(Self::LastMonth),
            "last-30-days" | "30d" => return Ok(Self::Last30Days),
            "this-year" | "year" => return Ok(Self::ThisYear),
            "all-time" | "all" => return Ok(Self::AllTime),
            _ => {}
        }

        if let Some((year, month)) = s.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                if let Ok(start) = first_of_month(year, month) {
                    return Ok(Self::Custom {
                        start,
                        end: last_of_month(start)?,
                    });
                }
            }
        }

        Err(CashiroError::Validation(format!(
            "Unknown period '{}'. Use today, this-week, this-month, last-month, \
             last-30-days, this-year, all-time, YYYY-MM or YYYY-MM-DD..YYYY-MM-DD",
            s
        )))
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::ThisWeek => write!(f, "this-week"),
            Self::ThisMonth => write!(f, "this-month"),
            Self::LastMonth => write!(f, "last-month"),
            Self::Last30Days => write!(f, "last-30-days"),
            Self::ThisYear => write!(f, "this-year"),
            Self::AllTime => write!(f, "all-time"),
            Self::Custom { start, end } => write!(f, "{}..{}", start, end),
        }
    }
}

//! Budget period representation
//!
//! A budget covers one rolling calendar unit: a day, an ISO week, a month or a
//! year. Periods are stored as upper-case text labels.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar unit a budget applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// Get all periods in order from shortest to longest
    pub fn all() -> &'static [Self] {
        &[Self::Day, Self::Week, Self::Month, Self::Year]
    }

    /// Stored label for this period
    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }

    /// First day of the period that contains `anchor`
    pub fn start_date(&self, anchor: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => anchor,
            Self::Week => {
                let week = anchor.iso_week();
                NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
                    .unwrap_or(anchor)
            }
            Self::Month => anchor.with_day(1).unwrap_or(anchor),
            Self::Year => NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor),
        }
    }

    /// Last day (inclusive) of the period that contains `anchor`
    pub fn end_date(&self, anchor: NaiveDate) -> NaiveDate {
        let start = self.start_date(anchor);
        match self {
            Self::Day => start,
            Self::Week => start + Duration::days(6),
            Self::Month => {
                let next_month = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                next_month.map_or(start, |d| d - Duration::days(1))
            }
            Self::Year => NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start),
        }
    }

    /// Check if `date` falls in the same period as `anchor`
    pub fn contains(&self, anchor: NaiveDate, date: NaiveDate) -> bool {
        date >= self.start_date(anchor) && date <= self.end_date(anchor)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAY" => Ok(Self::Day),
            "WEEK" => Ok(Self::Week),
            "MONTH" => Ok(Self::Month),
            "YEAR" => Ok(Self::Year),
            _ => Err(PeriodParseError(s.to_string())),
        }
    }
}

/// Error parsing a period label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodParseError(pub String);

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid period '{}' (expected DAY, WEEK, MONTH or YEAR)",
            self.0
        )
    }
}

impl std::error::Error for PeriodParseError {}

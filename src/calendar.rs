//! Calendar helpers on `chrono::NaiveDate`
//!
//! The simulation only ever looks at month/year granularity. Month arithmetic
//! clamps to the last day of the target month (Jan 31 + 1 month = Feb 28/29).

use chrono::{DateTime, Datelike, Local, Months, NaiveDate};

use crate::error::{Result, SimulationError};

/// Timestamps above this are treated as milliseconds rather than seconds
const MILLISECOND_THRESHOLD: i64 = 10_000_000_000;

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| SimulationError::InvalidDate(format!("{} + {} months is out of range", date, months)))
}

pub fn add_years(date: NaiveDate, years: u32) -> Result<NaiveDate> {
    let months = years
        .checked_mul(12)
        .ok_or_else(|| SimulationError::InvalidDate(format!("{} years is out of range", years)))?;
    add_months(date, months)
}

pub fn is_before(a: NaiveDate, b: NaiveDate) -> bool {
    a < b
}

/// Same calendar month of the same year
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn year(date: NaiveDate) -> i32 {
    date.year()
}

/// Calendar month, 1 = January
pub fn month(date: NaiveDate) -> u32 {
    date.month()
}

pub fn is_december(date: NaiveDate) -> bool {
    month(date) == 12
}

/// Month label used in the amortization table, e.g. "October 2026"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| SimulationError::InvalidDate(format!("'{}': {}", text, e)))
}

/// Convert a Unix timestamp to a UTC calendar date.
/// Values large enough to be milliseconds are scaled down first.
pub fn from_unix_timestamp(timestamp: i64) -> Result<NaiveDate> {
    let seconds = if timestamp > MILLISECOND_THRESHOLD {
        timestamp / 1000
    } else {
        timestamp
    };

    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| SimulationError::InvalidDate(format!("timestamp {} is out of range", timestamp)))
}

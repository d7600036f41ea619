//! Month keys and date parsing.
//!
//! Every transaction carries a canonical `YYYY/MM/DD` date string; the
//! grouping key for all monthly views is its `YYYY/MM` prefix. Keys are
//! zero-padded, so lexicographic order coincides with chronological
//! order and a plain string sort is enough everywhere.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical date format used on the wire.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// A `YYYY/MM` month identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey(String);

impl MonthKey {
    /// Derive the key from a canonical date string by truncating to the
    /// first seven characters. Short strings are taken as-is; they will
    /// simply form their own (anomalous) bucket rather than panic.
    pub fn from_date_str(date: &str) -> Self {
        let end = date
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(date.len());
        MonthKey(date[..end].to_string())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey(format!("{:04}/{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into calendar year and month, if the key is well-formed.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        let (year, month) = self.0.split_once('/')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    }

    /// The following calendar month, stepping the year at December.
    pub fn next(&self) -> Option<MonthKey> {
        let (year, month) = self.year_month()?;
        let (year, month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        Some(MonthKey(format!("{:04}/{:02}", year, month)))
    }

    /// The preceding calendar month, stepping the year at January.
    pub fn prev(&self) -> Option<MonthKey> {
        let (year, month) = self.year_month()?;
        let (year, month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        Some(MonthKey(format!("{:04}/{:02}", year, month)))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a canonical transaction date. `None` for anything malformed;
/// callers decide how a bad record degrades (it is never fatal).
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

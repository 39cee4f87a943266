//! Date ranges used to filter the optical image archive.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WaterspreadError};

/// First date with usable optical imagery in the archive.
pub fn imagery_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 3, 1).expect("valid calendar date")
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| WaterspreadError::InvalidDate {
        value: value.to_string(),
        reason: format!("{}. Use YYYY-MM-DD", e),
    })
}

/// A pair of calendar dates. Filtering treats `start` as inclusive and `end` as
/// exclusive, matching the imagery backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both ends from `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    /// The range preselected for an analyst session.
    pub fn session_default() -> Self {
        Self::new(
            imagery_floor(),
            NaiveDate::from_ymd_opt(2022, 3, 31).expect("valid calendar date"),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    /// Whether any part of the range precedes archive coverage
    pub fn starts_before_floor(&self) -> bool {
        self.start < imagery_floor()
    }

    /// Whether `other` lies entirely within this range
    pub fn covers(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::session_default()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

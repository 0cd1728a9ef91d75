use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("invalid year '{0}': expected four digits")]
    InvalidYear(String),
    #[error("invalid date '{0}': expected YYYYMMDD")]
    InvalidBoundary(String),
}

/// Inclusive calendar date range used to select log rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// January 1st through December 31st of `year`.
    pub fn year(year: i32) -> Result<Self, DateRangeError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| DateRangeError::InvalidYear(year.to_string()))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| DateRangeError::InvalidYear(year.to_string()))?;
        Ok(Self { start, end })
    }

    pub fn current_year() -> Self {
        let year = Local::now().year();
        // every year chrono can represent has a Jan 1st and a Dec 31st
        Self::year(year).unwrap_or_else(|_| Self::new(NaiveDate::MIN, NaiveDate::MAX))
    }

    /// Resolve request parameters into a range.
    ///
    /// `year` defaults to `current_year`; `start`/`end` each override the
    /// corresponding end of that year independently.
    pub fn resolve(
        year: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        current_year: i32,
    ) -> Result<Self, DateRangeError> {
        let year = match year.map(str::trim).filter(|y| !y.is_empty()) {
            Some(raw) => parse_year(raw)?,
            None => current_year,
        };
        let mut range = Self::year(year)?;
        if let Some(raw) = start.map(str::trim).filter(|s| !s.is_empty()) {
            range.start = parse_boundary(raw)?;
        }
        if let Some(raw) = end.map(str::trim).filter(|s| !s.is_empty()) {
            range.end = parse_boundary(raw)?;
        }
        Ok(range)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Boundaries in the compact `YYYYMMDD` form.
    pub fn keys(&self) -> (String, String) {
        (
            self.start.format("%Y%m%d").to_string(),
            self.end.format("%Y%m%d").to_string(),
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.keys();
        write!(f, "{}..={}", start, end)
    }
}

pub fn parse_year(raw: &str) -> Result<i32, DateRangeError> {
    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(DateRangeError::InvalidYear(raw.to_string()));
    }
    raw.parse::<i32>()
        .map_err(|_| DateRangeError::InvalidYear(raw.to_string()))
}

/// Parse a range boundary given as `YYYYMMDD` (or `YYYY-MM-DD`).
pub fn parse_boundary(raw: &str) -> Result<NaiveDate, DateRangeError> {
    let parsed = if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::parse_from_str(raw, "%Y%m%d")
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    };
    parsed.map_err(|_| DateRangeError::InvalidBoundary(raw.to_string()))
}

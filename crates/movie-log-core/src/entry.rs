use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use movie_log_models::viewing::flag;
use movie_log_models::NewViewing;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::error::ValidationError;

/// Date-only layouts, tried in order. Ambiguous numeric dates read month first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%a %b %d %Y",
];

/// Two-digit-year layouts, only tried after the four-digit ones.
const SHORT_YEAR_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%d %b %y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

fn ordinal_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d)(st|nd|rd|th)\b").expect("ordinal pattern is a valid regex"))
}

/// Normalize human-entered date text ("5/4/2024", "May 4th, 2024",
/// "2024-05-04T20:15:00Z", "20240504") to a calendar date.
pub fn parse_viewing_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate(raw.to_string());
    let text = raw.trim();
    if text.is_empty() {
        return Err(invalid());
    }

    if text.len() == 8 && text.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(text, "%Y%m%d").map_err(|_| invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }

    let cleaned = ordinal_suffix().replace_all(text, "$1");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    // %Y happily reads "24" as year 24, so four-digit layouts must yield a four-digit year
    let four_digit = DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .find(|date| date.year() >= 1000);
    if let Some(date) = four_digit {
        return Ok(date);
    }

    SHORT_YEAR_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .ok_or_else(invalid)
}

/// Entry payload as submitted by the logging form. Every field is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingSubmission {
    pub movie_title: String,
    pub viewing_date: String,
    #[serde(rename = "movieURL")]
    pub movie_url: String,
    pub view_format: String,
    pub view_location: String,
    pub movie_genre: String,
    pub movie_review: String,
    #[serde(with = "flag")]
    pub first_viewing: bool,
}

impl ViewingSubmission {
    pub fn normalize(self) -> Result<NewViewing, ValidationError> {
        let viewing_date = parse_viewing_date(&self.viewing_date)?;
        Ok(NewViewing {
            movie_title: self.movie_title,
            viewing_date,
            movie_url: self.movie_url,
            view_format: self.view_format,
            view_location: self.view_location,
            movie_genre: self.movie_genre,
            movie_review: self.movie_review,
            first_viewing: self.first_viewing,
        })
    }
}

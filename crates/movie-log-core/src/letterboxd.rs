use movie_log_models::{extract_imdb_id, ViewingEntry};
use serde::Serialize;
use tracing::debug;

use crate::error::ServiceError;

pub const LETTERBOXD_HEADER: [&str; 5] = ["Title", "imdbID", "WatchedDate", "Rewatch", "Review"];

/// One line of a Letterboxd diary import file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LetterboxdRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "WatchedDate")]
    pub watched_date: String,
    #[serde(rename = "Rewatch")]
    pub rewatch: &'static str,
    #[serde(rename = "Review")]
    pub review: String,
}

impl LetterboxdRow {
    /// `None` when the entry's URL carries no IMDb ID; Letterboxd cannot match those.
    pub fn from_entry(entry: &ViewingEntry) -> Option<Self> {
        let imdb_id = extract_imdb_id(&entry.movie_url)?;
        Some(Self {
            title: entry.movie_title.clone(),
            imdb_id: imdb_id.to_string(),
            watched_date: entry
                .viewing_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            rewatch: if entry.first_viewing { "False" } else { "True" },
            review: entry.movie_review.clone(),
        })
    }
}

pub fn letterboxd_rows(entries: &[ViewingEntry]) -> Vec<LetterboxdRow> {
    let rows: Vec<LetterboxdRow> = entries.iter().filter_map(LetterboxdRow::from_entry).collect();
    debug!(
        operation = "letterboxd_rows",
        entries = entries.len(),
        exported = rows.len(),
        skipped = entries.len() - rows.len(),
        "Projected entries for Letterboxd"
    );
    rows
}

/// Render entries as Letterboxd CSV. The header is always written, even with no rows.
pub fn letterboxd_csv(entries: &[ViewingEntry]) -> Result<String, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(LETTERBOXD_HEADER)
        .map_err(|e| ServiceError::Export(e.to_string()))?;
    for row in letterboxd_rows(entries) {
        writer
            .serialize(&row)
            .map_err(|e| ServiceError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Export(e.to_string()))
}

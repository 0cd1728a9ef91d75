use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const IMDB_ID_PATTERN: &str = r"tt[0-9]+";

fn imdb_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IMDB_ID_PATTERN).expect("IMDb ID pattern is a valid regex"))
}

/// Extract the first IMDb ID token (`tt` followed by digits) from a free-text URL.
///
/// Returns `None` when the URL carries no such token, e.g. entries logged
/// from sites other than IMDb.
pub fn extract_imdb_id(url: &str) -> Option<&str> {
    imdb_id_regex().find(url).map(|m| m.as_str())
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid IMDb ID '{0}': expected 'tt' followed by digits")]
pub struct InvalidImdbId(pub String);

/// A canonical IMDb identifier such as `tt0111161`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImdbId(String);

impl ImdbId {
    pub fn parse(raw: &str) -> Result<Self, InvalidImdbId> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix("tt").unwrap_or("");
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidImdbId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `url` contains this ID as a whole token.
    ///
    /// `tt123` is not contained in `.../tt1234/`: every `tt[0-9]+` run in the
    /// URL is compared in full.
    pub fn is_contained_in(&self, url: &str) -> bool {
        imdb_id_regex()
            .find_iter(url)
            .any(|m| m.as_str() == self.0)
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ImdbId {
    type Error = InvalidImdbId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImdbId> for String {
    fn from(id: ImdbId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_imdb_url() {
        assert_eq!(
            extract_imdb_id("https://www.imdb.com/title/tt1234567/"),
            Some("tt1234567")
        );
        assert_eq!(
            extract_imdb_id("https://m.imdb.com/title/tt0111161/?ref_=fn_al_tt_1"),
            Some("tt0111161")
        );
    }

    #[test]
    fn test_extract_requires_digits() {
        // "https" contains "tt" but no digits follow it
        assert_eq!(extract_imdb_id("https://example.com/no-id"), None);
        assert_eq!(extract_imdb_id(""), None);
    }

    #[test]
    fn test_parse_imdb_id() {
        assert_eq!(ImdbId::parse("tt0111161").unwrap().as_str(), "tt0111161");
        assert_eq!(ImdbId::parse(" tt42 ").unwrap().as_str(), "tt42");
        assert!(ImdbId::parse("tt").is_err());
        assert!(ImdbId::parse("0111161").is_err());
        assert!(ImdbId::parse("tt01x").is_err());
        assert!(ImdbId::parse("tt1%' OR '1'='1").is_err());
    }

    #[test]
    fn test_contained_in_matches_whole_token_only() {
        let id = ImdbId::parse("tt123").unwrap();
        assert!(id.is_contained_in("https://www.imdb.com/title/tt123/"));
        assert!(id.is_contained_in("tt123"));
        assert!(!id.is_contained_in("https://www.imdb.com/title/tt1234/"));
        assert!(!id.is_contained_in("https://example.com/no-id"));
    }

    #[test]
    fn test_serde_validates() {
        let id: ImdbId = serde_json::from_str("\"tt0944947\"").unwrap();
        assert_eq!(id.as_str(), "tt0944947");
        assert!(serde_json::from_str::<ImdbId>("\"nope\"").is_err());
    }
}

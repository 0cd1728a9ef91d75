use movie_log_models::ImdbId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ValidationError;

/// Decode the `json` request parameter every write/lookup endpoint takes.
pub fn parse_json_param<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, ValidationError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingParam("json"))?;
    serde_json::from_str(raw).map_err(|e| ValidationError::Payload(e.to_string()))
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DetailsRequest {
    #[serde(rename = "imdbID")]
    pub imdb_id: ImdbId,
}

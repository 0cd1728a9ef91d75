use movie_log_models::{DateRangeError, InvalidImdbId};
use movie_log_sources::GatewayError;
use movie_log_store::StoreError;
use thiserror::Error;

/// Bad client input, detected before anything is written or fetched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter '{0}'")]
    MissingParam(&'static str),

    #[error("malformed request payload: {0}")]
    Payload(String),

    #[error("unparseable viewing date '{0}'")]
    InvalidDate(String),

    #[error(transparent)]
    ImdbId(#[from] InvalidImdbId),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to render export: {0}")]
    Export(String),
}

use thiserror::Error;

/// Failure talking to the metadata API. Carries the upstream detail as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to metadata API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metadata API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("metadata API returned a non-JSON body: {0}")]
    InvalidBody(String),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection dropped or could not be (re)established.
    #[error("database connection lost: {0}")]
    ConnectionLost(String),

    /// The server refused the values of an insert (bad date, oversized text, NULL in a NOT NULL column).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, StoreError::ConnectionLost(_))
    }
}

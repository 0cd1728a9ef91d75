use async_trait::async_trait;
use movie_log_models::{DateRange, ImdbId, NewViewing, PriorViewing, ViewingEntry};

use crate::error::StoreError;

/// Raw access to the `movies` table.
///
/// Implementations report a dropped connection as [`StoreError::ConnectionLost`]
/// and leave retrying to [`crate::MovieLog`].
#[async_trait]
pub trait LogBackend: Send + Sync {
    fn backend_name(&self) -> &str;

    /// Rows whose viewing date falls inside `range`, in store order.
    async fn rows_between(&self, range: &DateRange) -> Result<Vec<ViewingEntry>, StoreError>;

    /// Every earlier viewing whose URL carries `imdb_id`, most recent first.
    async fn viewings_of(&self, imdb_id: &ImdbId) -> Result<Vec<PriorViewing>, StoreError>;

    async fn insert(&self, entry: &NewViewing) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Replace the current connection with a fresh one.
    async fn reconnect(&self) -> Result<(), StoreError>;
}

use movie_log_models::{DateRange, ImdbId, NewViewing, PriorViewing, ViewingEntry};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::LogBackend;
use crate::error::StoreError;

/// Data access layer for the movie log.
///
/// Every operation runs at most twice: if the first attempt fails with a lost
/// connection, the backend reconnects once and the operation is retried once.
/// Any other failure, or a second failure, is returned to the caller.
#[derive(Clone)]
pub struct MovieLog {
    backend: Arc<dyn LogBackend>,
}

impl MovieLog {
    pub fn new(backend: Arc<dyn LogBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.backend_name()
    }

    pub async fn rows_between(&self, range: &DateRange) -> Result<Vec<ViewingEntry>, StoreError> {
        let rows = self
            .with_reconnect("rows_between", || self.backend.rows_between(range))
            .await?;
        debug!(operation = "rows_between", range = %range, rows = rows.len(), "Loaded log rows");
        Ok(rows)
    }

    /// Most recent earlier viewing of `imdb_id`, if the title was logged before.
    pub async fn first_viewing_of(&self, imdb_id: &ImdbId) -> Result<Option<PriorViewing>, StoreError> {
        Ok(self.viewings_of(imdb_id).await?.into_iter().next())
    }

    pub async fn viewings_of(&self, imdb_id: &ImdbId) -> Result<Vec<PriorViewing>, StoreError> {
        self.with_reconnect("viewings_of", || self.backend.viewings_of(imdb_id))
            .await
    }

    pub async fn insert(&self, entry: &NewViewing) -> Result<(), StoreError> {
        self.with_reconnect("insert", || self.backend.insert(entry))
            .await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.with_reconnect("ping", || self.backend.ping()).await
    }

    async fn with_reconnect<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        match op().await {
            Err(StoreError::ConnectionLost(reason)) => {
                warn!(
                    operation,
                    backend = self.backend.backend_name(),
                    reason = %reason,
                    "Store connection lost, reconnecting and retrying once"
                );
                // a failed reconnect is surfaced as-is; the operation is not attempted again
                self.backend.reconnect().await?;
                op().await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use chrono::NaiveDate;

    fn viewing(title: &str, date: (i32, u32, u32), url: &str, genre: &str, first: bool) -> NewViewing {
        NewViewing {
            movie_title: title.to_string(),
            viewing_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            movie_url: url.to_string(),
            view_format: "Theatrical".to_string(),
            view_location: "Cinema".to_string(),
            movie_genre: genre.to_string(),
            movie_review: "Loved it".to_string(),
            first_viewing: first,
        }
    }

    fn log_with(backend: &Arc<MemoryBackend>) -> MovieLog {
        MovieLog::new(backend.clone())
    }

    #[tokio::test]
    async fn test_insert_then_query_round_trip() {
        let backend = Arc::new(MemoryBackend::default());
        let log = log_with(&backend);
        let new = viewing("Alien", (2024, 5, 4), "https://www.imdb.com/title/tt0078748/", "Horror", true);

        log.insert(&new).await.unwrap();
        let rows = log.rows_between(&DateRange::year(2024).unwrap()).await.unwrap();

        assert_eq!(rows, vec![new.into_entry()]);
    }

    #[tokio::test]
    async fn test_range_is_inclusive() {
        let backend = Arc::new(MemoryBackend::default());
        let log = log_with(&backend);
        log.insert(&viewing("A", (2023, 12, 31), "tt1", "Drama", true)).await.unwrap();
        log.insert(&viewing("B", (2024, 1, 1), "tt2", "Drama", true)).await.unwrap();
        log.insert(&viewing("C", (2024, 12, 31), "tt3", "Drama", true)).await.unwrap();
        log.insert(&viewing("D", (2025, 1, 1), "tt4", "Drama", true)).await.unwrap();

        let rows = log.rows_between(&DateRange::year(2024).unwrap()).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.movie_title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_dropped_connection_reconnects_once_and_returns_result() {
        let backend = Arc::new(MemoryBackend::default());
        let log = log_with(&backend);
        log.insert(&viewing("Alien", (2024, 5, 4), "tt0078748", "Horror", true)).await.unwrap();

        backend.drop_connection();
        let rows = log.rows_between(&DateRange::year(2024).unwrap()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(backend.reconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reconnect_surfaces_without_second_attempt() {
        let backend = Arc::new(MemoryBackend::default());
        backend.drop_connection();
        backend.refuse_reconnect(true);
        let log = log_with(&backend);

        let err = log.rows_between(&DateRange::year(2024).unwrap()).await.unwrap_err();

        assert!(err.is_connection_lost());
        assert_eq!(backend.reconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_retried_once_after_reconnect() {
        let backend = Arc::new(MemoryBackend::default());
        backend.drop_connection();
        let log = log_with(&backend);

        log.insert(&viewing("Alien", (2024, 5, 4), "tt0078748", "Horror", true)).await.unwrap();

        assert_eq!(backend.row_count().await, 1);
        assert_eq!(backend.reconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_params_are_not_retried() {
        let backend = Arc::new(MemoryBackend::default());
        backend.reject_inserts(true);
        let log = log_with(&backend);

        let err = log
            .insert(&viewing("Alien", (2024, 5, 4), "tt0078748", "Horror", true))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidParams(_)));
        assert_eq!(backend.reconnect_count(), 0);
        assert_eq!(backend.row_count().await, 0);
    }

    #[tokio::test]
    async fn test_first_viewing_of_returns_most_recent_prior() {
        let backend = Arc::new(MemoryBackend::default());
        let log = log_with(&backend);
        log.insert(&viewing("Alien", (2019, 1, 1), "https://www.imdb.com/title/tt0078748/", "Sci-Fi", true))
            .await
            .unwrap();
        log.insert(&viewing("Alien", (2022, 1, 1), "https://www.imdb.com/title/tt0078748/", "Horror", false))
            .await
            .unwrap();

        let id = ImdbId::parse("tt0078748").unwrap();
        let prior = log.first_viewing_of(&id).await.unwrap().unwrap();
        assert_eq!(prior.movie_genre, "Horror");
        assert_eq!(log.viewings_of(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_lookup_does_not_match_id_prefix() {
        let backend = Arc::new(MemoryBackend::default());
        let log = log_with(&backend);
        log.insert(&viewing("Other", (2024, 1, 1), "https://www.imdb.com/title/tt1234/", "Drama", true))
            .await
            .unwrap();

        let id = ImdbId::parse("tt123").unwrap();
        assert!(log.first_viewing_of(&id).await.unwrap().is_none());
    }
}

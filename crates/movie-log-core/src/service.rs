use movie_log_models::{DateRange, NewViewing, ViewingEntry};
use movie_log_sources::MetadataGateway;
use movie_log_store::MovieLog;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::details::enrich_details;
use crate::entry::ViewingSubmission;
use crate::error::ServiceError;
use crate::feed::{rss_feed, FeedInfo};
use crate::letterboxd::letterboxd_csv;
use crate::request::{DetailsRequest, SearchRequest};

/// Operations behind every HTTP endpoint, independent of transport.
#[derive(Clone)]
pub struct MovieService {
    log: MovieLog,
    metadata: Arc<dyn MetadataGateway>,
}

impl MovieService {
    pub fn new(log: MovieLog, metadata: Arc<dyn MetadataGateway>) -> Self {
        Self { log, metadata }
    }

    pub fn log(&self) -> &MovieLog {
        &self.log
    }

    pub async fn listing(&self, range: &DateRange) -> Result<Vec<ViewingEntry>, ServiceError> {
        Ok(self.log.rows_between(range).await?)
    }

    pub async fn letterboxd_export(&self, range: &DateRange) -> Result<String, ServiceError> {
        let rows = self.log.rows_between(range).await?;
        let csv = letterboxd_csv(&rows)?;
        info!(operation = "letterboxd_export", range = %range, rows = rows.len(), "Rendered Letterboxd export");
        Ok(csv)
    }

    pub async fn rss(&self, range: &DateRange, info: &FeedInfo) -> Result<String, ServiceError> {
        let rows = self.log.rows_between(range).await?;
        rss_feed(&rows, info)
    }

    /// Upstream search results, returned exactly as received.
    pub async fn search(&self, request: SearchRequest) -> Result<Value, ServiceError> {
        debug!(
            operation = "search",
            gateway = self.metadata.gateway_name(),
            title = %request.title,
            "Searching metadata"
        );
        Ok(self.metadata.search_by_title(&request.title).await?)
    }

    pub async fn details(&self, request: DetailsRequest) -> Result<Value, ServiceError> {
        let details = self.metadata.details_by_id(&request.imdb_id).await?;
        let prior = self.log.viewings_of(&request.imdb_id).await?;
        debug!(
            operation = "details",
            imdb_id = %request.imdb_id,
            prior_viewings = prior.len(),
            "Joined details with viewing history"
        );
        Ok(enrich_details(details, &prior))
    }

    pub async fn record(&self, submission: ViewingSubmission) -> Result<NewViewing, ServiceError> {
        let entry = submission.normalize()?;
        self.log.insert(&entry).await?;
        info!(
            operation = "record",
            title = %entry.movie_title,
            viewing_date = %entry.viewing_date,
            first_viewing = entry.first_viewing,
            "Logged viewing"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::request::parse_json_param;
    use chrono::NaiveDate;
    use movie_log_models::ImdbId;
    use movie_log_sources::{FakeMetadata, GatewayError};
    use movie_log_store::{MemoryBackend, StoreError};
    use serde_json::json;

    fn row(title: &str, date: (i32, u32, u32), url: &str, genre: &str, first: bool) -> ViewingEntry {
        ViewingEntry {
            movie_title: title.to_string(),
            viewing_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            movie_url: url.to_string(),
            view_format: "Streaming".to_string(),
            view_location: "Home".to_string(),
            first_viewing: first,
            movie_genre: genre.to_string(),
            movie_review: String::new(),
        }
    }

    fn service(backend: &Arc<MemoryBackend>, metadata: FakeMetadata) -> (MovieService, Arc<FakeMetadata>) {
        let metadata = Arc::new(metadata);
        let service = MovieService::new(MovieLog::new(backend.clone()), metadata.clone());
        (service, metadata)
    }

    fn submission(date: &str) -> ViewingSubmission {
        let raw = json!({
            "movieTitle": "Heat",
            "viewingDate": date,
            "movieURL": "https://www.imdb.com/title/tt0113277/",
            "viewFormat": "Blu-ray",
            "viewLocation": "Home",
            "movieGenre": "Crime",
            "movieReview": "Still great",
            "firstViewing": false
        })
        .to_string();
        parse_json_param(Some(&raw)).unwrap()
    }

    #[tokio::test]
    async fn test_record_then_list() {
        let backend = Arc::new(MemoryBackend::default());
        let (service, _) = service(&backend, FakeMetadata::default());

        let stored = service.record(submission("March 9th, 2024")).await.unwrap();
        assert_eq!(stored.viewing_date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        let listing = service.listing(&DateRange::year(2024).unwrap()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].movie_title, "Heat");
        assert!(!listing[0].first_viewing);
    }

    #[tokio::test]
    async fn test_invalid_date_inserts_nothing() {
        let backend = Arc::new(MemoryBackend::default());
        let (service, _) = service(&backend, FakeMetadata::default());

        let err = service.record(submission("the other day")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidDate(_))
        ));
        assert_eq!(backend.row_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_insert_is_invalid_params() {
        let backend = Arc::new(MemoryBackend::default());
        backend.reject_inserts(true);
        let (service, _) = service(&backend, FakeMetadata::default());

        let err = service.record(submission("2024-03-09")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::InvalidParams(_))));
        assert_eq!(backend.row_count().await, 0);
    }

    #[tokio::test]
    async fn test_details_for_unseen_title() {
        let backend = Arc::new(MemoryBackend::default());
        let (service, metadata) = service(
            &backend,
            FakeMetadata::default().with_details("tt0113277", json!({"Title": "Heat", "Genre": "Crime"})),
        );

        let details = service
            .details(DetailsRequest { imdb_id: ImdbId::parse("tt0113277").unwrap() })
            .await
            .unwrap();
        assert_eq!(details["firstViewing"], json!(true));
        assert!(details.get("previousGenre").is_none());
        assert_eq!(metadata.call_count(), 1);
    }

    #[tokio::test]
    async fn test_details_for_rewatched_title() {
        let backend = Arc::new(MemoryBackend::with_rows(vec![
            row("Heat", (2019, 6, 1), "https://www.imdb.com/title/tt0113277/", "Crime", true),
            row("Heat", (2023, 2, 11), "https://www.imdb.com/title/tt0113277/", "Heist", false),
            row("Heat 2", (2024, 1, 1), "https://www.imdb.com/title/tt01132770/", "Sequel", true),
        ]));
        let (service, _) = service(
            &backend,
            FakeMetadata::default().with_details("tt0113277", json!({"Title": "Heat"})),
        );

        let details = service
            .details(DetailsRequest { imdb_id: ImdbId::parse("tt0113277").unwrap() })
            .await
            .unwrap();
        assert_eq!(details["firstViewing"], json!(false));
        assert_eq!(details["previousGenre"], json!("Heist"));
        assert_eq!(details["previousViewings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_skips_history_lookup() {
        let backend = Arc::new(MemoryBackend::default());
        let (service, _) = service(&backend, FakeMetadata::failing(503));

        let err = service
            .details(DetailsRequest { imdb_id: ImdbId::parse("tt0113277").unwrap() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(GatewayError::Status { status: 503, .. })));
        assert_eq!(backend.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_search_is_passthrough() {
        let backend = Arc::new(MemoryBackend::default());
        let upstream = json!({"Search": [{"Title": "Heat", "imdbID": "tt0113277"}], "Response": "True"});
        let (service, _) = service(&backend, FakeMetadata::default().with_search_response(upstream.clone()));

        let result = service.search(SearchRequest { title: "Heat".to_string() }).await.unwrap();
        assert_eq!(result, upstream);
    }

    #[tokio::test]
    async fn test_json_and_csv_agree_on_membership() {
        let backend = Arc::new(MemoryBackend::with_rows(vec![
            row("Heat", (2024, 1, 5), "https://www.imdb.com/title/tt0113277/", "Crime", true),
            row("Home movie", (2024, 2, 5), "https://example.com/no-id", "Family", true),
            row("Alien", (2024, 3, 5), "https://www.imdb.com/title/tt0078748/", "Horror", false),
            row("Out of range", (2023, 3, 5), "https://www.imdb.com/title/tt0000001/", "Drama", true),
        ]));
        let (service, _) = service(&backend, FakeMetadata::default());
        let range = DateRange::year(2024).unwrap();

        let listing = service.listing(&range).await.unwrap();
        let csv = service.letterboxd_export(&range).await.unwrap();

        let listed: Vec<&str> = listing
            .iter()
            .filter(|e| movie_log_models::extract_imdb_id(&e.movie_url).is_some())
            .map(|e| e.movie_title.as_str())
            .collect();
        let exported: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(listing.len(), 3);
        assert_eq!(listed, exported);
    }

    #[tokio::test]
    async fn test_rss_lists_range_rows() {
        let backend = Arc::new(MemoryBackend::with_rows(vec![
            row("Heat", (2024, 1, 5), "https://www.imdb.com/title/tt0113277/", "Crime", true),
            row("Older", (2023, 1, 5), "https://www.imdb.com/title/tt0000001/", "Drama", true),
        ]));
        let (service, _) = service(&backend, FakeMetadata::default());

        let xml = service
            .rss(&DateRange::year(2024).unwrap(), &FeedInfo::default())
            .await
            .unwrap();
        assert!(xml.contains("<title>Heat</title>"), "{}", xml);
        assert!(!xml.contains("Older"), "{}", xml);
    }

    #[tokio::test]
    async fn test_dropped_connection_recovers_transparently() {
        let backend = Arc::new(MemoryBackend::with_rows(vec![row(
            "Heat",
            (2024, 1, 5),
            "https://www.imdb.com/title/tt0113277/",
            "Crime",
            true,
        )]));
        backend.drop_connection();
        let (service, _) = service(&backend, FakeMetadata::default());

        let listing = service.listing(&DateRange::year(2024).unwrap()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(backend.reconnect_count(), 1);
    }
}

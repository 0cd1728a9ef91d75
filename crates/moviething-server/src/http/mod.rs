use axum::routing::get;
use axum::Router;
use movie_log_core::{FeedInfo, MovieService};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod error;
mod handlers;
mod params;


#[derive(Clone)]
pub struct AppState {
    pub service: MovieService,
    /// Shared secret required by every protected endpoint.
    pub api_key: Arc<str>,
    pub feed: Arc<FeedInfo>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: MovieService, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            api_key: api_key.into(),
            feed: Arc::new(FeedInfo::default()),
            started_at: Instant::now(),
        }
    }

    pub fn with_feed(mut self, feed: FeedInfo) -> Self {
        self.feed = Arc::new(feed);
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_entries).post(handlers::list_entries))
        .route("/searchMovie", get(handlers::search_movie).post(handlers::search_movie))
        .route(
            "/getMovieDetails",
            get(handlers::movie_details).post(handlers::movie_details),
        )
        .route("/newEntry", get(handlers::new_entry).post(handlers::new_entry))
        .route(
            "/exportLetterboxd",
            get(handlers::export_letterboxd).post(handlers::export_letterboxd),
        )
        .route("/rss", get(handlers::rss_feed))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub mod details;
pub mod entry;
pub mod error;
pub mod feed;
pub mod letterboxd;
pub mod request;
pub mod service;

pub use details::enrich_details;
pub use entry::{parse_viewing_date, ViewingSubmission};
pub use error::{ServiceError, ValidationError};
pub use feed::{rss_feed, FeedInfo};
pub use letterboxd::{letterboxd_csv, letterboxd_rows, LetterboxdRow};
pub use request::{parse_json_param, DetailsRequest, SearchRequest};
pub use service::MovieService;

use chrono::{TimeZone, Utc};
use movie_log_models::ViewingEntry;
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use tracing::debug;

use crate::error::ServiceError;

const NO_REVIEW: &str = "No review available";

/// Channel-level metadata for the viewing feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedInfo {
    pub title: String,
    pub description: String,
    /// Public base URL of the site; the feed lives at `{site_url}/rss`.
    pub site_url: String,
}

impl Default for FeedInfo {
    fn default() -> Self {
        Self {
            title: "MovieThing".to_string(),
            description: "Movies I've watched".to_string(),
            site_url: "http://localhost:3000".to_string(),
        }
    }
}

fn feed_item(entry: &ViewingEntry) -> Item {
    let title = if entry.movie_genre == "Short" {
        format!("Short: {}", entry.movie_title)
    } else {
        entry.movie_title.clone()
    };
    let description = if entry.movie_review.is_empty() {
        NO_REVIEW.to_string()
    } else {
        entry.movie_review.clone()
    };
    // midnight UTC of the logged day; undated legacy rows carry no pubDate
    let pub_date = entry
        .viewing_date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt).to_rfc2822());

    ItemBuilder::default()
        .title(Some(title))
        .description(Some(description))
        .link(Some(entry.movie_url.clone()))
        .guid(Some(
            GuidBuilder::default()
                .value(entry.movie_url.clone())
                .permalink(false)
                .build(),
        ))
        .pub_date(pub_date)
        .build()
}

/// Render entries as an RSS 2.0 document, one item per entry in store order.
pub fn rss_feed(entries: &[ViewingEntry], info: &FeedInfo) -> Result<String, ServiceError> {
    let site_url = info.site_url.trim_end_matches('/');
    let items: Vec<Item> = entries.iter().map(feed_item).collect();
    debug!(operation = "rss_feed", items = items.len(), "Rendering RSS feed");

    let channel = ChannelBuilder::default()
        .title(info.title.clone())
        .description(info.description.clone())
        .link(site_url.to_string())
        .language(Some("en".to_string()))
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .items(items)
        .build();

    let bytes = channel
        .write_to(Vec::new())
        .map_err(|e| ServiceError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Export(e.to_string()))
}

use async_trait::async_trait;
use movie_log_config::OmdbConfig;
use movie_log_models::ImdbId;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::GatewayError;
use crate::traits::MetadataGateway;

const USER_AGENT: &str = concat!("moviething/", env!("CARGO_PKG_VERSION"));

/// OMDb client. Search and detail lookups may live on different hosts
/// (the private search endpoint and the public detail endpoint).
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
    search_url: String,
    details_url: String,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            search_url: config.search_url.clone(),
            details_url: config.details_url.clone(),
        })
    }

    fn search_request_url(&self, title: &str) -> String {
        format!(
            "{}?apiKey={}&s={}&type=movie",
            self.search_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(title)
        )
    }

    fn details_request_url(&self, imdb_id: &ImdbId) -> String {
        format!(
            "{}?apiKey={}&i={}",
            self.details_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(imdb_id.as_str())
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
    }
}

#[async_trait]
impl MetadataGateway for OmdbClient {
    fn gateway_name(&self) -> &str {
        "omdb"
    }

    async fn search_by_title(&self, title: &str) -> Result<Value, GatewayError> {
        debug!(operation = "omdb_search", title = %title, "Searching OMDb");
        self.get_json(&self.search_request_url(title)).await
    }

    async fn details_by_id(&self, imdb_id: &ImdbId) -> Result<Value, GatewayError> {
        debug!(operation = "omdb_details", imdb_id = %imdb_id, "Fetching OMDb details");
        self.get_json(&self.details_request_url(imdb_id)).await
    }
}

use async_trait::async_trait;
use movie_log_models::ImdbId;
use serde_json::Value;

use crate::error::GatewayError;

/// External movie metadata lookup. Responses are relayed without reshaping.
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    fn gateway_name(&self) -> &str;

    async fn search_by_title(&self, title: &str) -> Result<Value, GatewayError>;

    async fn details_by_id(&self, imdb_id: &ImdbId) -> Result<Value, GatewayError>;
}

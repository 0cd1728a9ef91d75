use async_trait::async_trait;
use movie_log_models::ImdbId;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::GatewayError;
use crate::traits::MetadataGateway;

/// Canned metadata responses; counts every call so callers can assert none were made.
#[derive(Default)]
pub struct FakeMetadata {
    pub search_response: Value,
    pub details: HashMap<String, Value>,
    pub fail_with_status: Option<u16>,
    calls: AtomicU64,
}

impl FakeMetadata {
    pub fn with_details(mut self, imdb_id: &str, details: Value) -> Self {
        self.details.insert(imdb_id.to_string(), details);
        self
    }

    pub fn with_search_response(mut self, response: Value) -> Self {
        self.search_response = response;
        self
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with_status {
            Some(status) => Err(GatewayError::Status {
                status,
                body: r#"{"Response":"False","Error":"Request limit reached!"}"#.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataGateway for FakeMetadata {
    fn gateway_name(&self) -> &str {
        "fake"
    }

    async fn search_by_title(&self, _title: &str) -> Result<Value, GatewayError> {
        self.record_call()?;
        Ok(self.search_response.clone())
    }

    async fn details_by_id(&self, imdb_id: &ImdbId) -> Result<Value, GatewayError> {
        self.record_call()?;
        Ok(self
            .details
            .get(imdb_id.as_str())
            .cloned()
            .unwrap_or_else(|| json!({"Response": "False", "Error": "Incorrect IMDb ID."})))
    }
}

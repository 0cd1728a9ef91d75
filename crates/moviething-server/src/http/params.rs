use axum::async_trait;
use axum::extract::{Form, FromRequest, Query, Request};
use axum::http::{header, Method};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use super::error::ApiError;
use super::AppState;
use movie_log_core::ValidationError;

pub const API_KEY_PARAM: &str = "apiKey";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Request parameters from the query string, with the fields of a form or
/// JSON POST body merged over them.
#[derive(Debug, Default, Clone)]
pub struct RequestParams(HashMap<String, String>);

impl RequestParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

enum BodyKind {
    Form,
    Json,
    Other,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else if content_type.starts_with("application/json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

/// Flatten a JSON body field to the string a form field would carry.
/// `{"json": {...}}` and `{"json": "{...}"}` both yield the encoded object.
fn json_field(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .map_err(|e| ValidationError::Payload(e.body_text()))?;

        if req.method() != Method::POST {
            return Ok(Self(params));
        }

        match body_kind(&req) {
            BodyKind::Form => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::Payload(e.body_text()))?;
                params.extend(fields);
            }
            BodyKind::Json => {
                let Json(fields) = Json::<HashMap<String, Value>>::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::Payload(e.body_text()))?;
                params.extend(
                    fields
                        .into_iter()
                        .filter_map(|(key, value)| json_field(value).map(|v| (key, v))),
                );
            }
            BodyKind::Other => {}
        }

        Ok(Self(params))
    }
}

/// Parameters of a request that presented the shared secret, as the
/// `apiKey` parameter or an `x-api-key` header. Rejection happens before
/// the handler body runs.
#[derive(Debug)]
pub struct Authorized(pub RequestParams);

#[async_trait]
impl FromRequest<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let path = req.uri().path().to_owned();
        let params = RequestParams::from_request(req, state).await;

        let matches = |presented: Option<&str>| {
            !state.api_key.is_empty() && presented == Some(&*state.api_key)
        };
        let header_ok = matches(header_key.as_deref());

        // A malformed body only gets a 400 once the caller has proven it holds
        // the secret; anyone else sees the same bare 401.
        match params {
            Ok(params) if header_ok || matches(params.get(API_KEY_PARAM)) => Ok(Self(params)),
            Err(e) if header_ok => Err(e),
            _ => {
                warn!(path = %path, "Rejected request without a valid API key");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

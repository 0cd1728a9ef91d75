use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use movie_log_core::{ServiceError, ValidationError};
use movie_log_store::StoreError;
use serde_json::json;
use tracing::{error, warn};

/// Everything a handler can fail with, mapped onto the wire contract.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong shared secret; answered with an empty body.
    Unauthorized,
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Service(ServiceError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Service(err) => err,
        };

        match err {
            ServiceError::Validation(e) => {
                warn!(error = %e, "Rejected request parameters");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"Error": "Param Error", "message": e.to_string()})),
                )
                    .into_response()
            }
            // The entry form only understands this exact body
            ServiceError::Store(StoreError::InvalidParams(reason)) => {
                warn!(reason = %reason, "Store rejected entry values");
                (StatusCode::BAD_REQUEST, Json(json!({"Error": "Param Error"}))).into_response()
            }
            ServiceError::Store(e) => {
                error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": e.to_string()})),
                )
                    .into_response()
            }
            ServiceError::Gateway(e) => {
                error!(error = %e, "Metadata request failed");
                (StatusCode::BAD_GATEWAY, Json(json!({"error": e.to_string()}))).into_response()
            }
            ServiceError::Export(e) => {
                error!(error = %e, "Export failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": e})),
                )
                    .into_response()
            }
        }
    }
}

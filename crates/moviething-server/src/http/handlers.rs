use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Local, Utc};
use movie_log_core::{
    parse_json_param, DetailsRequest, SearchRequest, ValidationError, ViewingSubmission,
};
use movie_log_models::{DateRange, ViewingEntry};
use serde::Serialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::params::{Authorized, RequestParams};
use super::AppState;

fn current_year() -> i32 {
    Local::now().year()
}

/// `GET/POST /` - the chart client's listing for one calendar year.
pub async fn list_entries(
    State(state): State<AppState>,
    params: RequestParams,
) -> Result<Json<Vec<ViewingEntry>>, ApiError> {
    let range = DateRange::resolve(params.get("year"), None, None, current_year())
        .map_err(ValidationError::from)?;
    Ok(Json(state.service.listing(&range).await?))
}

pub async fn search_movie(
    State(state): State<AppState>,
    Authorized(params): Authorized,
) -> Result<Json<Value>, ApiError> {
    let request: SearchRequest = parse_json_param(params.get("json"))?;
    Ok(Json(state.service.search(request).await?))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Authorized(params): Authorized,
) -> Result<Json<Value>, ApiError> {
    let request: DetailsRequest = parse_json_param(params.get("json"))?;
    Ok(Json(state.service.details(request).await?))
}

pub async fn new_entry(
    State(state): State<AppState>,
    Authorized(params): Authorized,
) -> Result<Json<Value>, ApiError> {
    let submission: ViewingSubmission = parse_json_param(params.get("json"))?;
    state.service.record(submission).await?;
    Ok(Json(json!({"OK": "Success"})))
}

pub async fn export_letterboxd(
    State(state): State<AppState>,
    Authorized(params): Authorized,
) -> Result<Response, ApiError> {
    let range = DateRange::resolve(
        params.get("year"),
        params.get("startDate"),
        params.get("endDate"),
        current_year(),
    )
    .map_err(ValidationError::from)?;
    let csv = state.service.letterboxd_export(&range).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=letterboxd.csv"),
        ],
        csv,
    )
        .into_response())
}

/// `GET /rss` - the year's viewings as an RSS 2.0 feed. Unauthenticated like the listing.
pub async fn rss_feed(
    State(state): State<AppState>,
    params: RequestParams,
) -> Result<Response, ApiError> {
    let range = DateRange::resolve(params.get("year"), None, None, current_year())
        .map_err(ValidationError::from)?;
    let xml = state.service.rss(&range, &state.feed).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        xml,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime_seconds: u64,
    database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Response {
    let (code, status, database) = match state.service.log().ping().await {
        Ok(()) => (
            StatusCode::OK,
            "ok",
            DatabaseHealth {
                status: "up",
                message: None,
            },
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "degraded",
            DatabaseHealth {
                status: "down",
                message: Some(e.to_string()),
            },
        ),
    };

    let body = HealthResponse {
        status,
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
    };
    (code, Json(body)).into_response()
}

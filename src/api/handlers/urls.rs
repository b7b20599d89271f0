//! Handlers for reading short link metadata.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::LimitParams;
use crate::api::dto::url::UrlResponse;
use crate::domain::entities::UrlRecord;
use crate::error::AppError;
use crate::state::AppState;

/// Returns metadata for a short link without counting a click.
///
/// # Endpoint
///
/// `GET /api/urls/{code}/info`
///
/// Expired links are still reported, with `expired: true`.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn info_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<UrlResponse>, AppError> {
    let record = state.shortener.get_info(&code).await?;
    let short_url = state.short_url(&record.code);

    Ok(Json(UrlResponse::from_record(record, short_url, Utc::now())))
}

/// Lists the most recently created links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls/recent?limit=10`
///
/// # Errors
///
/// Returns 400 Bad Request if `limit` is not an integer in `1..=100`.
pub async fn recent_handler(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<UrlResponse>>, AppError> {
    let limit = parse_limit(params)?;
    let records = state.shortener.recent(limit).await?;

    Ok(Json(to_responses(&state, records)))
}

/// Lists the most clicked links, highest count first.
///
/// # Endpoint
///
/// `GET /api/urls/top-clicked?limit=10`
///
/// # Errors
///
/// Returns 400 Bad Request if `limit` is not an integer in `1..=100`.
pub async fn top_clicked_handler(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<UrlResponse>>, AppError> {
    let limit = parse_limit(params)?;
    let records = state.shortener.top_clicked(limit).await?;

    Ok(Json(to_responses(&state, records)))
}

fn parse_limit(params: Result<Query<LimitParams>, QueryRejection>) -> Result<i64, AppError> {
    let Query(params) = params.map_err(|e| {
        AppError::bad_request("Invalid query parameters", json!({ "reason": e.body_text() }))
    })?;
    params.validate()?;

    Ok(params.limit())
}

fn to_responses(state: &AppState, records: Vec<UrlRecord>) -> Vec<UrlResponse> {
    let now = Utc::now();
    records
        .into_iter()
        .map(|record| {
            let short_url = state.short_url(&record.code);
            UrlResponse::from_record(record, short_url, now)
        })
        .collect()
}

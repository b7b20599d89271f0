//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::ShortenRequest;
use crate::api::dto::url::UrlResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or reuses) a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/urls/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "expires_at": "2030-01-01T00:00:00Z"  // optional
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aZ3k9Q",
///   "short_url": "http://localhost:3000/aZ3k9Q",
///   "original_url": "https://example.com/some/long/path",
///   "created_at": "2026-01-01T12:00:00Z",
///   "expires_at": "2030-01-01T00:00:00Z",
///   "click_count": 0,
///   "expired": false,
///   "remaining_hours": 35052
/// }
/// ```
///
/// If a live link for the same URL already exists it is returned as is,
/// including its original expiry and click count.
///
/// # Errors
///
/// - 400 `invalid_url` if the URL fails validation
/// - 400 `validation_error` for malformed bodies
/// - 503 `code_space_exhausted` if no free code was found
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<UrlResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let record = state
        .shortener
        .shorten(&payload.url, payload.expires_at)
        .await?;

    let short_url = state.short_url(&record.code);
    Ok(Json(UrlResponse::from_record(record, short_url, Utc::now())))
}

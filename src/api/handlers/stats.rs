//! Handlers for aggregate statistics and maintenance.

use axum::{Json, extract::State};

use crate::api::dto::stats::{CleanupResponse, StatisticsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns totals across all short links.
///
/// # Endpoint
///
/// `GET /api/urls/statistics`
///
/// # Response
///
/// ```json
/// {
///   "total_urls": 42,
///   "total_clicks": 1337,
///   "average_clicks": 31.83,
///   "urls_today": 5
/// }
/// ```
///
/// `urls_today` counts links created since 00:00 UTC.
pub async fn statistics_handler(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let stats = state.shortener.statistics().await?;
    Ok(Json(stats.into()))
}

/// Deletes expired links immediately instead of waiting for the worker.
///
/// # Endpoint
///
/// `DELETE /api/urls/cleanup`
///
/// # Response
///
/// ```json
/// { "removed": 3 }
/// ```
pub async fn cleanup_handler(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let removed = state.shortener.cleanup_expired().await?;
    Ok(Json(CleanupResponse { removed }))
}

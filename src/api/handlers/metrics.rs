//! Handler for the Prometheus scrape endpoint.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::infrastructure::metrics::CONTENT_TYPE;
use crate::state::AppState;

/// Exports counters in Prometheus text format.
///
/// # Endpoint
///
/// `GET /metrics`
///
/// # Response
///
/// ```text
/// # HELP shortlink_redirects_total Successful short code resolutions
/// # TYPE shortlink_redirects_total counter
/// shortlink_redirects_total 42
/// ```
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                String::from("Failed to encode metrics"),
            )
        }
    }
}

//! API route configuration.

use crate::api::handlers::{
    cleanup_handler, info_handler, recent_handler, shorten_handler, statistics_handler,
    top_clicked_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Short link management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /urls/shorten`      - Create a short link
/// - `GET    /urls/{code}/info`  - Link metadata (no click counted)
/// - `GET    /urls/recent`       - Newest links
/// - `GET    /urls/top-clicked`  - Most clicked links
/// - `GET    /urls/statistics`   - Aggregate totals
/// - `DELETE /urls/cleanup`      - Remove expired links now
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls/shorten", post(shorten_handler))
        .route("/urls/recent", get(recent_handler))
        .route("/urls/top-clicked", get(top_clicked_handler))
        .route("/urls/statistics", get(statistics_handler))
        .route("/urls/cleanup", delete(cleanup_handler))
        .route("/urls/{code}/info", get(info_handler))
}

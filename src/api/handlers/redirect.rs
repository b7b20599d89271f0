//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Each successful redirect increments the link's click count. Unknown and
/// expired codes get the same 404.
///
/// # Errors
///
/// Returns 404 Not Found if there is no live link for the code.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.shortener.resolve(&code).await?;

    debug!(code = %code, "Redirecting");
    Ok(Redirect::temporary(&original_url))
}

//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Request to shorten a single URL.
///
/// Only the length is checked here; syntax is validated by the shortener so
/// that the HTTP API and the admin CLI accept exactly the same inputs.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten. A missing scheme defaults to `http://`.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional expiry timestamp (RFC 3339). After this time the code stops resolving.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

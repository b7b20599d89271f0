//! Query parameters for list endpoints.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

/// Number of items returned when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 10;

/// `?limit=` for the recent and top-clicked listings.
///
/// Uses `serde_with` to parse the limit from the query string as an integer.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LimitParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

impl LimitParams {
    /// The requested limit, or [`DEFAULT_LIMIT`].
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

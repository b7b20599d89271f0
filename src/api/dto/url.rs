//! Public representation of a stored short link.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::UrlRecord;

/// A short link as returned by the API.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub expired: bool,
    /// Whole hours left before expiry; absent for links that never expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_hours: Option<i64>,
}

impl UrlResponse {
    /// Builds the response for `record`, evaluating expiry at `now`.
    pub fn from_record(record: UrlRecord, short_url: String, now: DateTime<Utc>) -> Self {
        let expired = record.is_expired_at(now);
        let remaining_hours = record.remaining_hours_at(now);

        Self {
            short_code: record.code,
            short_url,
            original_url: record.original_url,
            created_at: record.created_at,
            expires_at: record.expires_at,
            click_count: record.click_count,
            expired,
            remaining_hours,
        }
    }
}

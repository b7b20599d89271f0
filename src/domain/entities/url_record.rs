//! URL record entity representing a short code mapping.

use chrono::{DateTime, Utc};

/// A short code mapped to its original URL.
///
/// `code`, `original_url` and `created_at` never change after creation.
/// `click_count` only grows, and only through the store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlRecord {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
}

impl UrlRecord {
    /// Creates a fresh record with a zero click count.
    pub fn new(
        code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            original_url,
            created_at,
            expires_at,
            click_count: 0,
        }
    }

    /// Returns true if the record's expiry lies strictly before `now`.
    ///
    /// Matches the predicate used by `CodeStore::delete_expired_before`, so a
    /// record hidden from resolution is exactly one the next sweep removes.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole hours until expiry.
    ///
    /// `None` when the record never expires, `Some(0)` once it has expired.
    pub fn remaining_hours_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|e| {
            if now >= e {
                0
            } else {
                (e - now).num_hours()
            }
        })
    }
}

//! Storage contract for short code records.

use crate::domain::entities::{StoreSummary, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistent mapping from short code to [`UrlRecord`].
///
/// The store is the only shared mutable state in the system and owns its own
/// concurrency control. Two operations carry atomicity requirements that the
/// shortener relies on:
///
/// - [`insert_if_absent`](CodeStore::insert_if_absent) must make concurrent
///   claims of the same code mutually exclusive.
/// - [`increment_click`](CodeStore::increment_click) must be a single atomic
///   increment, never a read-modify-write done by the caller.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCodeStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryCodeStore`] - in-process `DashMap`
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Returns true if any record (expired or not) holds `code`.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts `record` unless its code is already taken.
    ///
    /// Returns `Ok(true)` if the record was inserted and `Ok(false)` if the
    /// code was already present. The check and the insert are one atomic step.
    async fn insert_if_absent(&self, record: &UrlRecord) -> Result<bool, AppError>;

    /// Point lookup by code, regardless of expiry.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Atomically adds one to the record's click count.
    ///
    /// Returns `Ok(false)` if no record holds `code`.
    async fn increment_click(&self, code: &str) -> Result<bool, AppError>;

    /// All records whose original URL equals `url`, oldest first.
    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlRecord>, AppError>;

    /// Deletes every record with `expires_at` set and strictly before `now`.
    ///
    /// Returns the number of records removed. Records already gone are skipped.
    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Most recently created records, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError>;

    /// Records with the highest click counts, descending.
    async fn top_clicked(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError>;

    /// Totals over all records; `created_since` counts records created at or after `since`.
    async fn summary(&self, since: DateTime<Utc>) -> Result<StoreSummary, AppError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), AppError>;
}

//! Aggregate counts over the stored records.

/// Totals computed by the store in a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct StoreSummary {
    pub total_urls: i64,
    pub total_clicks: i64,
    /// Records created at or after the instant passed to
    /// [`crate::domain::repositories::CodeStore::summary`].
    pub created_since: i64,
}

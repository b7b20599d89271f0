//! PostgreSQL implementation of the code store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{StoreSummary, UrlRecord};
use crate::domain::repositories::CodeStore;
use crate::error::AppError;

/// PostgreSQL store for URL records.
///
/// Code uniqueness is enforced by the primary key on `url_records.code`;
/// inserts use `ON CONFLICT DO NOTHING` so a lost race reports `false`
/// instead of an error. Click increments are a single `UPDATE` statement.
pub struct PgCodeStore {
    pool: Arc<PgPool>,
}

impl PgCodeStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeStore for PgCodeStore {
    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM url_records WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn insert_if_absent(&self, record: &UrlRecord) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_records (code, original_url, created_at, expires_at, click_count)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(&record.code)
        .bind(&record.original_url)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.click_count)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT code, original_url, created_at, expires_at, click_count
            FROM url_records
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_click(&self, code: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE url_records SET click_count = click_count + 1 WHERE code = $1")
                .bind(code)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlRecord>, AppError> {
        let records = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT code, original_url, created_at, expires_at, click_count
            FROM url_records
            WHERE original_url = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(url)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(records)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM url_records WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        let records = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT code, original_url, created_at, expires_at, click_count
            FROM url_records
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(records)
    }

    async fn top_clicked(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        let records = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT code, original_url, created_at, expires_at, click_count
            FROM url_records
            ORDER BY click_count DESC, created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(records)
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<StoreSummary, AppError> {
        let summary = sqlx::query_as::<_, StoreSummary>(
            r#"
            SELECT
                COUNT(*) AS total_urls,
                COALESCE(SUM(click_count), 0)::BIGINT AS total_clicks,
                COUNT(*) FILTER (WHERE created_at >= $1) AS created_since
            FROM url_records
            "#,
        )
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(summary)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

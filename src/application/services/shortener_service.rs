//! Short code allocation and resolution.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, SubsecRound, Utc};
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::CodeStore;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_normalizer::normalize_url;

/// Draws allowed per `shorten` call before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Aggregate figures across all stored records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStatistics {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub average_clicks: f64,
    /// Records created since 00:00 UTC today.
    pub urls_today: i64,
}

/// The shortener engine.
///
/// Turns URLs into uniquely coded records and codes back into redirect
/// targets. Keeps no mutable state of its own: uniqueness rests on
/// [`CodeStore::insert_if_absent`] and click accounting on
/// [`CodeStore::increment_click`], so one instance can serve any number of
/// concurrent requests.
pub struct ShortenerService<S: CodeStore + ?Sized> {
    store: Arc<S>,
    generator: CodeGenerator,
    max_attempts: usize,
}

impl<S: CodeStore + ?Sized> ShortenerService<S> {
    /// Creates a new shortener.
    ///
    /// `max_attempts` bounds the number of random draws per `shorten` call.
    pub fn new(store: Arc<S>, generator: CodeGenerator, max_attempts: usize) -> Self {
        Self {
            store,
            generator,
            max_attempts,
        }
    }

    /// Creates a shortener with 6-symbol base62 codes and 10 attempts.
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, CodeGenerator::default(), DEFAULT_MAX_ATTEMPTS)
    }

    /// Shortens `url`, optionally expiring at `expires_at`.
    ///
    /// # Deduplication
    ///
    /// If a non-expired record for the same canonical URL already exists, the
    /// oldest such record is returned unchanged and nothing is written. The
    /// lookup and the insert are not atomic, so two concurrent calls for the
    /// same URL may both create codes.
    ///
    /// # Code Allocation
    ///
    /// Each attempt draws a random code, skips it if the store already holds
    /// it, and otherwise claims it with [`CodeStore::insert_if_absent`]. A
    /// claim lost to a concurrent writer counts as a collision too.
    ///
    /// `expires_at` is accepted as given, including instants in the past.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the URL fails validation
    /// - [`AppError::CodeSpaceExhausted`] after `max_attempts` collisions
    /// - [`AppError::Storage`] on store failures
    pub async fn shorten(
        &self,
        url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<UrlRecord, AppError> {
        let original_url = normalize_url(url).map_err(|e| {
            AppError::invalid_url("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let now = Utc::now();

        if let Some(existing) = self
            .store
            .find_by_url(&original_url)
            .await?
            .into_iter()
            .find(|r| !r.is_expired_at(now))
        {
            debug!(code = %existing.code, "Reusing existing short code");
            return Ok(existing);
        }

        // Storage keeps microseconds; truncate so the returned record matches it.
        let created_at = now.trunc_subsecs(6);
        let expires_at = expires_at.map(|t| t.trunc_subsecs(6));

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();

            if self.store.exists(&code).await? {
                debug!(attempt, code = %code, "Short code collision");
                metrics::counter!("shortlink_code_collisions_total").increment(1);
                continue;
            }

            let record = UrlRecord::new(code, original_url.clone(), created_at, expires_at);

            if self.store.insert_if_absent(&record).await? {
                info!(code = %record.code, attempt, "Short code created");
                metrics::counter!("shortlink_codes_created_total").increment(1);
                return Ok(record);
            }

            debug!(attempt, code = %record.code, "Short code claimed concurrently");
            metrics::counter!("shortlink_code_collisions_total").increment(1);
        }

        error!(
            attempts = self.max_attempts,
            code_length = self.generator.length(),
            alphabet_size = self.generator.alphabet_size(),
            code_space = %self.generator.code_space(),
            "Short code space exhausted"
        );
        metrics::counter!("shortlink_code_space_exhausted_total").increment(1);

        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Resolves `code` to its original URL and counts one click.
    ///
    /// Unknown, empty and expired codes all yield the same `NotFound`, and
    /// none of them touch the click count. Expired records are left in the
    /// store for [`Self::cleanup_expired`].
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if there is no live record for `code`
    /// - [`AppError::Storage`] on store failures
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(short_code_not_found(code));
        }

        let record = self
            .store
            .find_by_code(code)
            .await?
            .filter(|r| !r.is_expired())
            .ok_or_else(|| short_code_not_found(code))?;

        // The sweep may have removed the record since the lookup.
        if !self.store.increment_click(code).await? {
            return Err(short_code_not_found(code));
        }

        metrics::counter!("shortlink_redirects_total").increment(1);
        Ok(record.original_url)
    }

    /// Deletes every record whose expiry has passed.
    ///
    /// Returns the number of records removed.
    pub async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_expired_before(Utc::now()).await?;

        if removed > 0 {
            info!(removed, "Removed expired short links");
            metrics::counter!("shortlink_expired_removed_total").increment(removed);
        }

        Ok(removed)
    }

    /// Looks up a record without counting a click.
    ///
    /// Expired records are still returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record holds `code`.
    pub async fn get_info(&self, code: &str) -> Result<UrlRecord, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(short_code_not_found(code));
        }

        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| short_code_not_found(code))
    }

    /// Most recently created records, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        self.store.recent(limit).await
    }

    /// Most clicked records, descending.
    pub async fn top_clicked(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        self.store.top_clicked(limit).await
    }

    /// Totals across the store plus today's creation count.
    pub async fn statistics(&self) -> Result<SystemStatistics, AppError> {
        let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let summary = self.store.summary(start_of_day).await?;

        let average_clicks = if summary.total_urls > 0 {
            summary.total_clicks as f64 / summary.total_urls as f64
        } else {
            0.0
        };

        Ok(SystemStatistics {
            total_urls: summary.total_urls,
            total_clicks: summary.total_clicks,
            average_clicks,
            urls_today: summary.created_since,
        })
    }

    /// Returns `Ok(())` if the store answers.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }
}

fn short_code_not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::StoreSummary;
    use crate::domain::repositories::MockCodeStore;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_test_record(code: &str, url: &str, expires_at: Option<DateTime<Utc>>) -> UrlRecord {
        UrlRecord::new(code.to_string(), url.to_string(), Utc::now(), expires_at)
    }

    fn service(store: MockCodeStore) -> ShortenerService<MockCodeStore> {
        ShortenerService::with_defaults(Arc::new(store))
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut store = MockCodeStore::new();

        store
            .expect_find_by_url()
            .withf(|url| url == "https://example.com/")
            .times(1)
            .returning(|_| Ok(vec![]));
        store.expect_exists().times(1).returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .withf(|record| record.code.len() == 6 && record.click_count == 0)
            .times(1)
            .returning(|_| Ok(true));

        let record = service(store)
            .shorten("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(record.original_url, "https://example.com/");
        assert_eq!(record.code.len(), 6);
        assert!(record.code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(record.click_count, 0);
        assert!(record.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_shorten_applies_default_scheme() {
        let mut store = MockCodeStore::new();

        store
            .expect_find_by_url()
            .withf(|url| url == "http://example.com/path")
            .times(1)
            .returning(|_| Ok(vec![]));
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .withf(|record| record.original_url == "http://example.com/path")
            .times(1)
            .returning(|_| Ok(true));

        let record = service(store).shorten("example.com/path", None).await.unwrap();
        assert_eq!(record.original_url, "http://example.com/path");
    }

    #[tokio::test]
    async fn test_shorten_stores_expiry() {
        let mut store = MockCodeStore::new();
        let expires_at = Utc::now() + Duration::days(7);
        let expected = expires_at.trunc_subsecs(6);

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .withf(move |record| record.expires_at == Some(expected))
            .times(1)
            .returning(|_| Ok(true));

        let record = service(store)
            .shorten("https://example.com", Some(expires_at))
            .await
            .unwrap();
        assert_eq!(record.expires_at, Some(expected));
    }

    #[tokio::test]
    async fn test_shorten_accepts_past_expiry() {
        let mut store = MockCodeStore::new();
        let expires_at = Utc::now() - Duration::hours(1);

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(true));

        let record = service(store)
            .shorten("https://example.com", Some(expires_at))
            .await
            .unwrap();
        assert!(record.is_expired());
    }

    #[tokio::test]
    async fn test_shorten_deduplication() {
        let mut store = MockCodeStore::new();

        let existing = create_test_record("exist1", "https://example.com/", None);
        let returned = existing.clone();
        store
            .expect_find_by_url()
            .times(1)
            .returning(move |_| Ok(vec![returned.clone()]));
        store.expect_exists().times(0);
        store.expect_insert_if_absent().times(0);

        let record = service(store)
            .shorten("https://example.com", None)
            .await
            .unwrap();
        assert_eq!(record, existing);
    }

    #[tokio::test]
    async fn test_shorten_skips_expired_duplicate() {
        let mut store = MockCodeStore::new();

        let expired = create_test_record(
            "old001",
            "https://example.com/",
            Some(Utc::now() - Duration::minutes(1)),
        );
        store
            .expect_find_by_url()
            .times(1)
            .returning(move |_| Ok(vec![expired.clone()]));
        store.expect_exists().times(1).returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(true));

        let record = service(store)
            .shorten("https://example.com", None)
            .await
            .unwrap();
        assert_ne!(record.code, "old001");
    }

    #[tokio::test]
    async fn test_shorten_reuses_first_live_duplicate() {
        let mut store = MockCodeStore::new();

        let expired = create_test_record(
            "old001",
            "https://example.com/",
            Some(Utc::now() - Duration::minutes(1)),
        );
        let live = create_test_record("live01", "https://example.com/", None);
        store
            .expect_find_by_url()
            .times(1)
            .returning(move |_| Ok(vec![expired.clone(), live.clone()]));
        store.expect_insert_if_absent().times(0);

        let record = service(store)
            .shorten("https://example.com", None)
            .await
            .unwrap();
        assert_eq!(record.code, "live01");
    }

    #[tokio::test]
    async fn test_shorten_invalid_url() {
        for input in ["not a url", "", "   ", "ftp://example.com/file"] {
            let store = MockCodeStore::new();

            let result = service(store).shorten(input, None).await;

            assert!(
                matches!(result, Err(AppError::InvalidUrl { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_shorten_retries_on_collision() {
        let mut store = MockCodeStore::new();
        let exists_calls = Arc::new(AtomicUsize::new(0));
        let counter = exists_calls.clone();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store
            .expect_exists()
            .times(4)
            .returning(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) < 3));
        store
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(true));

        let result = service(store).shorten("https://example.com", None).await;

        assert!(result.is_ok());
        assert_eq!(exists_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_shorten_retries_when_insert_loses_race() {
        let mut store = MockCodeStore::new();
        let insert_calls = Arc::new(AtomicUsize::new(0));
        let counter = insert_calls.clone();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().times(2).returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .times(2)
            .returning(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) > 0));

        let result = service(store).shorten("https://example.com", None).await;

        assert!(result.is_ok());
        assert_eq!(insert_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shorten_code_space_exhausted_after_ten_attempts() {
        let mut store = MockCodeStore::new();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().times(10).returning(|_| Ok(true));
        store.expect_insert_if_absent().times(0);

        let result = service(store).shorten("https://example.com", None).await;

        assert!(matches!(
            result,
            Err(AppError::CodeSpaceExhausted { attempts: 10 })
        ));
    }

    #[tokio::test]
    async fn test_shorten_exhausted_by_lost_races() {
        let mut store = MockCodeStore::new();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().times(10).returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .times(10)
            .returning(|_| Ok(false));

        let result = service(store).shorten("https://example.com", None).await;

        assert!(matches!(
            result,
            Err(AppError::CodeSpaceExhausted { attempts: 10 })
        ));
    }

    #[tokio::test]
    async fn test_shorten_respects_configured_attempts() {
        let mut store = MockCodeStore::new();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().times(3).returning(|_| Ok(true));

        let service = ShortenerService::new(Arc::new(store), CodeGenerator::default(), 3);
        let result = service.shorten("https://example.com", None).await;

        assert!(matches!(
            result,
            Err(AppError::CodeSpaceExhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_shorten_uses_configured_generator() {
        let mut store = MockCodeStore::new();

        store.expect_find_by_url().returning(|_| Ok(vec![]));
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_insert_if_absent()
            .withf(|record| record.code.len() == 10 && record.code.chars().all(|c| c == 'x' || c == 'y'))
            .times(1)
            .returning(|_| Ok(true));

        let generator = CodeGenerator::new("xy", 10).unwrap();
        let service = ShortenerService::new(Arc::new(store), generator, DEFAULT_MAX_ATTEMPTS);

        assert!(service.shorten("https://example.com", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_propagates_storage_error() {
        let mut store = MockCodeStore::new();

        store
            .expect_find_by_url()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));
        store.expect_insert_if_absent().times(0);

        let result = service(store).shorten("https://example.com", None).await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_resolve_increments_click() {
        let mut store = MockCodeStore::new();

        let record = create_test_record("abc123", "https://example.com/", None);
        store
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_increment_click()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(true));

        let url = service(store).resolve("abc123").await.unwrap();
        assert_eq!(url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_resolve_trims_code() {
        let mut store = MockCodeStore::new();

        let record = create_test_record("abc123", "https://example.com/", None);
        store
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_increment_click()
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(store).resolve("  abc123 ").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut store = MockCodeStore::new();

        store.expect_find_by_code().times(1).returning(|_| Ok(None));
        store.expect_increment_click().times(0);

        let result = service(store).resolve("nope12").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_expired_is_not_found() {
        let mut store = MockCodeStore::new();

        let record = create_test_record(
            "abc123",
            "https://example.com/",
            Some(Utc::now() - Duration::seconds(1)),
        );
        store
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        store.expect_increment_click().times(0);

        let result = service(store).resolve("abc123").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_empty_code() {
        let mut store = MockCodeStore::new();
        store.expect_find_by_code().times(0);

        let result = service(store).resolve("  ").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_record_removed_before_increment() {
        let mut store = MockCodeStore::new();

        let record = create_test_record("abc123", "https://example.com/", None);
        store
            .expect_find_by_code()
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_increment_click()
            .times(1)
            .returning(|_| Ok(false));

        let result = service(store).resolve("abc123").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_info_does_not_count_click() {
        let mut store = MockCodeStore::new();

        let record = create_test_record(
            "abc123",
            "https://example.com/",
            Some(Utc::now() - Duration::hours(1)),
        );
        store
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(record.clone())));
        store.expect_increment_click().times(0);

        let info = service(store).get_info("abc123").await.unwrap();
        assert_eq!(info.code, "abc123");
        assert!(info.is_expired());
    }

    #[tokio::test]
    async fn test_cleanup_expired_returns_count() {
        let mut store = MockCodeStore::new();

        store
            .expect_delete_expired_before()
            .times(1)
            .returning(|_| Ok(3));

        assert_eq!(service(store).cleanup_expired().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_statistics_average() {
        let mut store = MockCodeStore::new();

        store.expect_summary().times(1).returning(|_| {
            Ok(StoreSummary {
                total_urls: 4,
                total_clicks: 10,
                created_since: 1,
            })
        });

        let stats = service(store).statistics().await.unwrap();
        assert_eq!(stats.total_urls, 4);
        assert_eq!(stats.total_clicks, 10);
        assert_eq!(stats.average_clicks, 2.5);
        assert_eq!(stats.urls_today, 1);
    }

    #[tokio::test]
    async fn test_statistics_empty_store() {
        let mut store = MockCodeStore::new();

        store
            .expect_summary()
            .returning(|_| Ok(StoreSummary::default()));

        let stats = service(store).statistics().await.unwrap();
        assert_eq!(stats.average_clicks, 0.0);
    }

    #[test]
    fn test_short_url() {
        let service = service(MockCodeStore::new());

        assert_eq!(
            service.short_url("http://localhost:3000/", "abc123"),
            "http://localhost:3000/abc123"
        );
        assert_eq!(
            service.short_url("https://s.example.com", "abc123"),
            "https://s.example.com/abc123"
        );
    }
}

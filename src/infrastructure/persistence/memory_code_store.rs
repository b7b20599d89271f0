//! In-process implementation of the code store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{StoreSummary, UrlRecord};
use crate::domain::repositories::CodeStore;
use crate::error::AppError;

/// `DashMap`-backed store keyed by short code.
///
/// Atomicity comes from the shard locks: `insert_if_absent` goes through the
/// entry API and `increment_click` mutates under the write guard, so neither
/// can interleave with another writer on the same code. Contents are lost on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    records: DashMap<String, UrlRecord>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn snapshot(&self) -> Vec<UrlRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.records.contains_key(code))
    }

    async fn insert_if_absent(&self, record: &UrlRecord) -> Result<bool, AppError> {
        match self.records.entry(record.code.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    async fn increment_click(&self, code: &str) -> Result<bool, AppError> {
        match self.records.get_mut(code) {
            Some(mut record) => {
                record.click_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_url(&self, url: &str) -> Result<Vec<UrlRecord>, AppError> {
        let mut matches: Vec<UrlRecord> = self
            .records
            .iter()
            .filter(|r| r.original_url == url)
            .map(|r| r.value().clone())
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut removed = 0u64;
        self.records.retain(|_, record| {
            let expired = record.expires_at.is_some_and(|e| e < now);
            if expired {
                removed += 1;
            }
            !expired
        });
        Ok(removed)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(clamp_limit(limit));
        Ok(records)
    }

    async fn top_clicked(&self, limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        records.truncate(clamp_limit(limit));
        Ok(records)
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<StoreSummary, AppError> {
        let summary = self
            .records
            .iter()
            .fold(StoreSummary::default(), |mut acc, r| {
                acc.total_urls += 1;
                acc.total_clicks += r.click_count;
                if r.created_at >= since {
                    acc.created_since += 1;
                }
                acc
            });
        Ok(summary)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

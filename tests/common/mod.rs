#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;
use shortlink::application::services::{DEFAULT_MAX_ATTEMPTS, ShortenerService};
use shortlink::domain::entities::{StoreSummary, UrlRecord};
use shortlink::domain::repositories::CodeStore;
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::MemoryCodeStore;
use shortlink::routes::router;
use shortlink::state::AppState;
use shortlink::utils::code_generator::CodeGenerator;
use std::sync::Arc;

pub const BASE_URL: &str = "http://sho.rt";

/// State over a fresh in-memory store, returned alongside for direct inspection.
pub fn create_test_state() -> (AppState, Arc<MemoryCodeStore>) {
    let store = Arc::new(MemoryCodeStore::new());
    let state = create_state_with(store.clone(), CodeGenerator::default());
    (state, store)
}

pub fn create_state_with(store: Arc<dyn CodeStore>, generator: CodeGenerator) -> AppState {
    let shortener = Arc::new(ShortenerService::new(
        store,
        generator,
        DEFAULT_MAX_ATTEMPTS,
    ));
    AppState::new(shortener, BASE_URL)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

pub async fn create_test_link(
    store: &MemoryCodeStore,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
) {
    let record = UrlRecord::new(code.to_string(), url.to_string(), Utc::now(), expires_at);
    assert!(store.insert_if_absent(&record).await.unwrap());
}

pub async fn click_count(store: &MemoryCodeStore, code: &str) -> i64 {
    store
        .find_by_code(code)
        .await
        .unwrap()
        .map(|r| r.click_count)
        .unwrap_or_default()
}

/// A store whose every operation fails, for exercising error paths.
pub struct FailingStore;

fn unavailable() -> AppError {
    AppError::storage("Database error", json!({}))
}

#[async_trait]
impl CodeStore for FailingStore {
    async fn exists(&self, _code: &str) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn insert_if_absent(&self, _record: &UrlRecord) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<UrlRecord>, AppError> {
        Err(unavailable())
    }

    async fn increment_click(&self, _code: &str) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn find_by_url(&self, _url: &str) -> Result<Vec<UrlRecord>, AppError> {
        Err(unavailable())
    }

    async fn delete_expired_before(&self, _now: DateTime<Utc>) -> Result<u64, AppError> {
        Err(unavailable())
    }

    async fn recent(&self, _limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        Err(unavailable())
    }

    async fn top_clicked(&self, _limit: i64) -> Result<Vec<UrlRecord>, AppError> {
        Err(unavailable())
    }

    async fn summary(&self, _since: DateTime<Utc>) -> Result<StoreSummary, AppError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unavailable())
    }
}

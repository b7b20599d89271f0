//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::repositories::CodeStore;
use crate::infrastructure::metrics::MetricsHandle;

/// State shared by every request.
///
/// Cloning is cheap: the engine sits behind an `Arc` and the base URL is a
/// shared string.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService<dyn CodeStore>>,
    /// Public prefix for generated short URLs, without a trailing slash.
    pub base_url: Arc<str>,
    /// Source for `GET /metrics`. Empty unless a recorder was installed.
    pub metrics: MetricsHandle,
}

impl AppState {
    pub fn new(shortener: Arc<ShortenerService<dyn CodeStore>>, base_url: &str) -> Self {
        Self {
            shortener,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            metrics: MetricsHandle::default(),
        }
    }

    /// Serves `metrics` from `GET /metrics`.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Full short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        self.shortener.short_url(&self.base_url, code)
    }
}

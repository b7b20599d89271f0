//! DTOs for the statistics and cleanup endpoints.

use serde::Serialize;

use crate::application::services::SystemStatistics;

/// Aggregate figures across all short links.
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub average_clicks: f64,
    pub urls_today: i64,
}

impl From<SystemStatistics> for StatisticsResponse {
    fn from(stats: SystemStatistics) -> Self {
        Self {
            total_urls: stats.total_urls,
            total_clicks: stats.total_clicks,
            average_clicks: stats.average_clicks,
            urls_today: stats.urls_today,
        }
    }
}

/// Result of a manual expired-link sweep.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

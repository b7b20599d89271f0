//! Background sweep of expired short links.
//!
//! Resolution already hides expired records; this task reclaims their storage
//! on a fixed period. Failures are logged and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use crate::application::services::ShortenerService;
use crate::domain::repositories::CodeStore;

/// Spawns the sweep loop on the current runtime.
///
/// The first sweep runs immediately, then once per `period`. The task runs
/// until the runtime shuts down or the handle is aborted.
pub fn spawn_cleanup_worker<S>(shortener: Arc<ShortenerService<S>>, period: Duration) -> JoinHandle<()>
where
    S: CodeStore + ?Sized + 'static,
{
    tokio::spawn(run_cleanup_worker(shortener, period))
}

/// Runs the sweep loop forever.
pub async fn run_cleanup_worker<S>(shortener: Arc<ShortenerService<S>>, period: Duration)
where
    S: CodeStore + ?Sized,
{
    info!(period_secs = period.as_secs(), "Cleanup worker started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match shortener.cleanup_expired().await {
            Ok(0) => debug!("Cleanup sweep found nothing to remove"),
            Ok(removed) => debug!(removed, "Cleanup sweep finished"),
            Err(e) => error!(error = %e, "Cleanup sweep failed"),
        }
    }
}

//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, migrations, the cleanup worker, and the Axum
//! server lifecycle.

use crate::application::cleanup_worker::spawn_cleanup_worker;
use crate::application::services::ShortenerService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::CodeStore;
use crate::infrastructure::metrics;
use crate::infrastructure::persistence::{MemoryCodeStore, PgCodeStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The Prometheus metrics recorder
/// - The configured code store (PostgreSQL pool plus migrations, or in-memory)
/// - The shortener engine
/// - The expired-link cleanup worker (unless disabled)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let metrics = metrics::install()?;
    let store = build_store(&config).await?;
    let generator = config.code_generator()?;

    let shortener = Arc::new(ShortenerService::new(
        store,
        generator,
        config.code_max_attempts,
    ));

    let cleanup = config
        .cleanup_interval()
        .map(|period| spawn_cleanup_worker(shortener.clone(), period));
    if cleanup.is_none() {
        tracing::info!("Cleanup worker disabled");
    }

    let state = AppState::new(shortener, &config.base_url).with_metrics(metrics);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cleanup {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Builds the code store selected by `STORAGE_BACKEND`.
async fn build_store(config: &Config) -> Result<Arc<dyn CodeStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgCodeStore::new(Arc::new(pool))))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; short links are lost on restart");
            Ok(Arc::new(MemoryCodeStore::new()))
        }
    }
}

/// Opens the PostgreSQL pool using the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

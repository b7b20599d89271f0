//! Application layer: the shortener engine and its background jobs.
//!
//! Services consume the [`CodeStore`](crate::domain::repositories::CodeStore)
//! trait and expose the operations HTTP handlers and the admin CLI call.
//!
//! # Contents
//!
//! - [`services::ShortenerService`] - Code allocation, resolution and cleanup
//! - [`cleanup_worker`] - Periodic removal of expired records

pub mod cleanup_worker;
pub mod services;

//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`metrics`] - Prometheus recorder behind the `metrics` counters
//! - [`persistence`] - Code store implementations (PostgreSQL and in-memory)

pub mod metrics;
pub mod persistence;

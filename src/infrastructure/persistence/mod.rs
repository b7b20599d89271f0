//! Code store implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::CodeStore`].
//!
//! # Stores
//!
//! - [`PgCodeStore`] - PostgreSQL via SQLx, durable
//! - [`MemoryCodeStore`] - `DashMap` in process memory, for tests and single-node demos

pub mod memory_code_store;
pub mod pg_code_store;

pub use memory_code_store::MemoryCodeStore;
pub use pg_code_store::PgCodeStore;

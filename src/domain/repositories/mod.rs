//! Repository trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`CodeStore`] - Short code to URL record mapping

pub mod code_store;

pub use code_store::CodeStore;

#[cfg(test)]
pub use code_store::MockCodeStore;

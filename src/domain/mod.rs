//! Domain layer containing the URL record model and the storage contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - The [`repositories::CodeStore`] trait is implemented by the infrastructure layer
//! - Business logic lives in [`crate::application::services`]

pub mod entities;
pub mod repositories;

//! Core domain entities.
//!
//! - [`UrlRecord`] - A short code mapped to its original URL
//! - [`StoreSummary`] - Aggregate counts over all stored records

pub mod summary;
pub mod url_record;

pub use summary::StoreSummary;
pub use url_record::UrlRecord;

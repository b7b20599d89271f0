//! URL validation and canonicalization.
//!
//! Inputs without a scheme get `http://` prepended before parsing, so
//! `example.com/path` is accepted and stored as `http://example.com/path`.

use url::Url;

/// Scheme assumed when the input does not name one.
const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Validates a URL and returns its canonical form.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed; empty input is rejected
/// 2. `http://` is prepended unless the input already starts with
///    `http://` or `https://` (case-insensitive)
/// 3. Any other explicit `scheme://` is rejected
/// 4. The result must parse as a URL with a non-empty host
///
/// The canonical form is what the `url` crate serializes: lowercase scheme
/// and host, default port dropped, path and query preserved.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com/path").unwrap(), "http://example.com/path");
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path").unwrap(),
///     "https://example.com/Path"
/// );
/// assert!(normalize_url("not a url").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if lower.contains("://") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
    };

    let url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    Ok(url.to_string())
}

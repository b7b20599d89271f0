//! Application error type shared by the store, the shortener engine and the
//! HTTP layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submitted URL failed syntactic validation.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// A request parameter other than the URL is out of range or malformed.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The short code is unknown, malformed or expired.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Every random draw collided with an existing code.
    #[error("Failed to allocate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("{message}")]
    Storage { message: String, details: Value },
}

impl AppError {
    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the JSON payload sent to clients.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            AppError::InvalidUrl { message, details } => ErrorInfo {
                code: "invalid_url",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::CodeSpaceExhausted { attempts } => ErrorInfo {
                code: "code_space_exhausted",
                message: self.to_string(),
                details: json!({ "attempts": attempts }),
            },
            AppError::Storage { message, details } => ErrorInfo {
                code: "internal_error",
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", e);
        AppError::storage("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(e.field_errors()).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

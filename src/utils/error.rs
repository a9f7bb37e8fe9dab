//! Error Handling Utilities
//!
//! Application error taxonomy and the JSON error envelope returned by every
//! endpoint.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field-keyed validation messages, one message per field
pub type FieldErrors = BTreeMap<String, String>;

/// Main application error type returned by handlers and middleware
#[derive(Error, Debug)]
pub enum AppError {
    /// Payload rule violations, malformed identifiers and malformed filters
    #[error("Validation error: {reason}")]
    Validation {
        reason: String,
        fields: Option<FieldErrors>,
    },

    /// Request body could not be decoded
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Duplicate registrations and already-linked owners
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No matching entity
    #[error("{message}: {reason}")]
    NotFound { message: String, reason: String },

    /// Bad credentials or a missing, invalid or expired token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Caller is authenticated but not permitted
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request deadline exceeded
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Storage, hashing or other server-side failures
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure carrying the per-field messages
    pub fn validation(fields: FieldErrors) -> Self {
        AppError::Validation {
            reason: "Invalid Details".to_string(),
            fields: Some(fields),
        }
    }

    /// Validation failure without a field map (malformed id, unknown filter, ...)
    pub fn bad_request(reason: impl Into<String>) -> Self {
        AppError::Validation {
            reason: reason.into(),
            fields: None,
        }
    }

    pub fn not_found(message: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status code this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::InvalidJson(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope: `{message, statusCode, reason, errorObj}`
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    pub status_code: u16,
    pub reason: String,
    pub error_obj: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: &str, reason: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: status.as_u16(),
            reason: reason.to_string(),
            error_obj: None,
        }
    }

    pub fn with_details(
        status: StatusCode,
        message: &str,
        reason: &str,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_obj: Some(details),
            ..Self::new(status, message, reason)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = match self {
            AppError::Validation { reason, fields } => match fields {
                Some(fields) => ErrorResponse::with_details(
                    status,
                    "Validation Failed",
                    &reason,
                    serde_json::json!(fields),
                ),
                None => ErrorResponse::new(status, "Bad Request", &reason),
            },
            AppError::InvalidJson(detail) => {
                log::debug!("Rejected request body: {}", detail);
                ErrorResponse::new(status, "Bad Request", "Invalid JSON")
            }
            AppError::Conflict(reason) => ErrorResponse::new(status, "Conflict", &reason),
            AppError::NotFound { message, reason } => {
                ErrorResponse::new(status, &message, &reason)
            }
            AppError::Authentication(reason) => {
                ErrorResponse::new(status, "Unauthorized", &reason)
            }
            AppError::Forbidden(reason) => ErrorResponse::new(status, "Forbidden", &reason),
            AppError::Timeout(_) => ErrorResponse::new(
                status,
                "Request Timeout",
                "Request took too long to process",
            ),
            AppError::Internal(detail) => {
                log::error!("Internal server error: {}", detail);
                ErrorResponse::new(status, "Internal Server Error", "Something went wrong")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

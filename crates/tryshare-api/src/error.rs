//! # API Error Types
//!
//! Maps registry outcomes onto HTTP responses with a single JSON body shape.
//!
//! | Registry outcome                      | Status | Code                  |
//! |---------------------------------------|--------|-----------------------|
//! | `NotFound`                            | 404    | `NOT_FOUND`           |
//! | `Booking(NotAvailable / AlreadyAvailable)` | 409 | `CONFLICT`          |
//! | `Validation`                          | 422    | `VALIDATION_ERROR`    |
//! | `LockTimeout`                         | 503    | `SERVICE_UNAVAILABLE` |
//! | `Store`                               | 500    | `INTERNAL_ERROR`      |
//!
//! Booking rejections answer 409 rather than the plain 400 earlier clients
//! of this service received: the request was well formed, it lost against
//! the tricycle's current state.
//!
//! 5xx responses never carry internal detail; it goes to the log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tryshare_registry::RegistryError;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request could not be parsed or is inconsistent (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Transition rejected by the booking rules (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Temporarily unable to serve the request (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Logged, never returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::ServiceUnavailable(_) => "The service is busy, retry later".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::NotFound(_) => Self::NotFound(err.to_string()),
            RegistryError::Booking(_) => Self::Conflict(err.to_string()),
            RegistryError::Validation(_) => Self::Validation(err.to_string()),
            RegistryError::LockTimeout { .. } => Self::ServiceUnavailable(err.to_string()),
            RegistryError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

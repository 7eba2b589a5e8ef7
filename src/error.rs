use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::database::DatabaseError;
use crate::status::StatusError;

/// Stable, machine-readable error codes carried in every error body.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Errors produced by the task service.
///
/// Each variant maps to an HTTP status and a code from [`error_code`]:
///
/// ```json
/// {"code": "NOT_FOUND", "message": "task 'abc' not found"}
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed create/update payload. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Unknown task identifier. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Store unavailable or failing. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Anything else unexpected. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(id: &str) -> Self {
        ServiceError::NotFound(format!("task '{}' not found", id))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(e: DatabaseError) -> Self {
        ServiceError::Storage(e.to_string())
    }
}

impl From<StatusError> for ServiceError {
    fn from(e: StatusError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("store task failed: {}", e))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Unified error types for the Tapcard directory service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or invalid credentials / bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but insufficient role or ownership
    #[error("{0}")]
    Forbidden(String),

    /// Schema, enum, or field validation failures
    #[error("{0}")]
    Validation(String),

    /// Record lookup misses
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key (email, username)
    #[error("{0}")]
    Conflict(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Convert ApiError to an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Database(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                // Don't leak internal detail to the client
                tracing::error!("request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

/// Returns true when the database rejected a write for violating a
/// unique index. Used to translate races on email/username into Conflict.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Result type alias for service operations
pub type ApiResult<T> = Result<T, ApiError>;

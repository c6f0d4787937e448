//! Error types for the Resource Management server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Field-keyed validation failure. Recoverable by the caller; every
    /// failing field is reported, not just the first one.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// A transition was attempted from a state that does not permit it, or a
    /// contended resource was taken by a concurrent request.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A downstream action failed; the triggering entity has already been
    /// moved to its failure status by the time this surfaces.
    #[error("External failure: {0}")]
    External(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field-keyed messages, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, fields) = match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "authentication", msg, None)
            }
            AppError::Authorization(msg) => {
                // Generic denial; the reason stays server-side
                tracing::debug!("authorization denied: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    "authorization",
                    "Access denied".to_string(),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            AppError::Validation(fields) => {
                tracing::debug!("validation failed: {:?}", fields);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation",
                    "Validation failed".to_string(),
                    Some(fields),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, "external", msg, None),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database",
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

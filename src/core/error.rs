//! Typed error handling for the session store
//!
//! Only two failure kinds exist at the domain level: the target session is
//! missing, or its version tag no longer matches. Both are recoverable from
//! the caller's side: re-read and retry on a stale tag, abandon on a
//! missing entity. Everything else about a request (page bounds, blank
//! filters) is normalized rather than rejected.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted session does not exist
    #[error("session with id '{id}' not found")]
    NotFound { id: Uuid },

    /// The supplied version tag no longer matches the stored revision
    #[error("the session has been modified by another caller")]
    Conflict,

    /// A storage lock was poisoned by a panicking writer
    #[error("session store lock poisoned")]
    Lock,
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoreError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Conflict => StatusCode::PRECONDITION_FAILED,
            StoreError::Lock => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "SESSION_NOT_FOUND",
            StoreError::Conflict => "SESSION_MODIFIED",
            StoreError::Lock => "STORE_LOCK_POISONED",
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StoreError::NotFound { id } => Some(serde_json::json!({ "id": id.to_string() })),
            _ => None,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        });
        (status, body).into_response()
    }
}

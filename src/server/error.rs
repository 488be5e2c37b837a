//! HTTP-layer error mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::ValidationErrors;

use crate::core::{ErrorResponse, StoreError};

/// Errors a handler can surface.
///
/// Store errors keep their own status mapping; the remaining variants are
/// request-shape problems that never reach the store.
#[derive(Debug)]
pub enum ApiError {
    /// Domain error bubbled up from the store
    Store(StoreError),

    /// Request body failed field validation
    Validation(ValidationErrors),

    /// A session with the requested name already exists
    NameTaken { name: String },

    /// Conditional request arrived without an `If-Match` header
    MissingPrecondition,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(err) => return err.into_response(),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "the request body failed validation".to_string(),
                    details: serde_json::to_value(&errors).ok(),
                },
            ),
            ApiError::NameTaken { name } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "SESSION_NAME_TAKEN".to_string(),
                    message: format!("a session named '{name}' already exists"),
                    details: None,
                },
            ),
            ApiError::MissingPrecondition => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "MISSING_IF_MATCH".to_string(),
                    message: "this operation requires an If-Match header".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every endpoint returns the same
//! `{code, message, request_id}` shape.
//!
//! # Key invariants and assumptions
//! - Status codes must align with the error category.
//! - Storage failures log details server-side but return a generic message.
use crate::api::types::ErrorResponse;
use crate::model::MissingField;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use plants::api::error::ApiError;
/// use plants::api::types::ErrorResponse;
///
/// let err = ApiError {
///     status: StatusCode::NOT_FOUND,
///     body: ErrorResponse {
///         code: "not_found".to_string(),
///         message: "plant not found".to_string(),
///         request_id: None,
///     },
/// };
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                request_id: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<MissingField> for ApiError {
    fn from(err: MissingField) -> Self {
        api_missing_field(err)
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 400 error naming the absent required field.
pub fn api_missing_field(err: MissingField) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "missing_field", &err.to_string())
}

/// Build a 400 Bad Request validation error.
///
/// Used for bodies that are not JSON objects or carry wrongly typed values, and for
/// path ids that are not integers.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// Logs the store error and returns `message` to the client unchanged.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "plant storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Translate a store error for a single-plant operation.
///
/// `NotFound` becomes a 404; anything else is a storage failure with `failure` as
/// the client-facing message.
pub fn api_plant_error(err: StoreError, failure: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found("plant not found"),
        err => api_internal(failure, &err),
    }
}

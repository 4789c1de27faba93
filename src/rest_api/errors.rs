//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::{StoreError, StoreErrorCode};

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed filter, select or limit parameter
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Request body is not a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Store Errors
    // ==================
    /// Failure reported by the store
    #[error("{0}")]
    Store(#[from] StoreError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Operation did not finish within the request timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Blocking task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,

            RestError::Store(err) => match err.code() {
                StoreErrorCode::NotFound => StatusCode::NOT_FOUND,
                StoreErrorCode::InvalidQuery => StatusCode::BAD_REQUEST,
                StoreErrorCode::Canceled => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },

            // 504 Gateway Timeout
            RestError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            RestError::InvalidQueryParam(_) => StoreErrorCode::InvalidQuery.code(),
            RestError::InvalidBody(_) => "PALLAS_INVALID_BODY",
            RestError::Store(err) => err.code().code(),
            RestError::Timeout(_) => StoreErrorCode::Canceled.code(),
            RestError::Internal(_) => "PALLAS_INTERNAL_ERROR",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl From<&RestError> for ErrorResponse {
    fn from(err: &RestError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}

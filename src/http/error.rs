//! API error handling for consistent JSON error responses.
//!
//! Failure details stay in the server log; responses carry only a generic
//! message so backend internals never leak to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Log the underlying error, answer with a generic message.
    pub fn internal(err: anyhow::Error) -> Self {
        error!("internal error: {:#}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

//! Error types for callscore-ai
//!
//! `ApiError` is the only error type that crosses the HTTP boundary. Model
//! failures reach it only from the analytics-chat path; the analysis
//! pipeline absorbs them into a fallback score.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::model_client::ModelError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request field missing or malformed (400)
    #[error("{0}")]
    BadRequest(String),

    /// No valid session (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but role not allowed (403)
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409) - e.g. email already registered
    #[error("{0}")]
    Conflict(String),

    /// Upstream model failure surfaced to the caller (500)
    #[error("Model request failed: {0}")]
    Upstream(#[from] ModelError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// callscore-common error
    #[error(transparent)]
    Common(#[from] callscore_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use callscore_common::Error as CommonError;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(inner) => match inner {
                CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CommonError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                CommonError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            ApiError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// Unreadable request bodies answer with the same envelope as other 400s
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = self.to_string();

        if status.is_server_error() {
            error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

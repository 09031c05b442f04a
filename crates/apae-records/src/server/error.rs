//! Mapping of store errors onto HTTP responses.
//!
//! | Error | HTTP Status | Body |
//! |-------|-------------|------|
//! | NotFound | 404 | `{"message": ...}` |
//! | unknown resource | 404 | `{"message": ...}` |
//! | anything else | 500 | `{"error": ...}` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::Error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] Error),

    /// The route named a resource that is not served.
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
}

/// Result type for request handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The status code this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::UnknownResource(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::NOT_FOUND {
            json!({ "message": self.to_string() })
        } else {
            error!(error = %self, "Request failed");
            json!({ "error": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

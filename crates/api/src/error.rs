use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitecache_core::error::CoreError;

use crate::cache::CacheError;
use crate::content::{ContentError, RenderError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitecache_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The cache store failed as a whole.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The data service could not supply page content.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit hit; the caller may retry after the given number of seconds.
    #[error("Too many requests, retry after {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnknownPage(path) => AppError::NotFound(format!("No page at {path}")),
            RenderError::Content(e) => AppError::Content(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Cache / content errors ---
            AppError::Cache(err) => {
                tracing::error!(error = %err, "Cache store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_UNAVAILABLE",
                    "Cache store unavailable".to_string(),
                )
            }
            AppError::Content(err) => {
                tracing::error!(error = %err, "Data service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Content temporarily unavailable".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::TooManyRequests { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Try again in {retry_after_secs}s"),
            ),
        };

        let body = if status == StatusCode::UNAUTHORIZED {
            json!({
                "success": false,
                "error": message,
                "code": code,
            })
        } else {
            json!({
                "error": message,
                "code": code,
            })
        };

        let mut response = (status, axum::Json(body)).into_response();
        if let AppError::TooManyRequests { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

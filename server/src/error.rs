//! Error types for the store and the HTTP layer.
//!
//! `StoreError` keeps "not found" apart from backend failures so handlers can
//! answer 404 without inspecting error messages. `ApiError` is what handlers
//! return; its `IntoResponse` impl is the only place status codes are chosen.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("empty title")]
    EmptyTitle,

    #[error("todo not found")]
    NotFound,

    /// The backing storage failed. The cause is kept for server-side logs.
    #[error("storage backend failure: {0:#}")]
    Backend(#[source] anyhow::Error),
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: bad id, empty title, invalid JSON, id mismatch.
    #[error("{0}")]
    BadRequest(String),

    #[error("todo not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyTitle => ApiError::BadRequest(err.to_string()),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Backend(_) => ApiError::Internal(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "todo not found".to_string()),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal exception");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

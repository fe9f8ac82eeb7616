//! Errors returned by `TodoClient` methods.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 404.
    #[error("todo not found")]
    NotFound,

    /// Any other unexpected status. `body` is the server's error text.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

//! Error types for the bwstats-kv crate

use thiserror::Error;

/// Result type for key-value store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for key-value store operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error talking to the REST backend
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend reported a command error
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend returned a response we could not interpret
    #[error("unexpected backend response for {command}: {detail}")]
    UnexpectedResponse {
        /// Command that produced the response
        command: &'static str,
        /// What was wrong with it
        detail: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL cannot carry command path segments
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Error {
    /// Create a backend command error
    pub fn backend(detail: impl Into<String>) -> Self {
        Self::Backend(detail.into())
    }

    /// Create an unexpected-response error
    pub fn unexpected(command: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            command,
            detail: detail.into(),
        }
    }
}

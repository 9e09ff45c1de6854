//! Model client error types.

use thiserror::Error;

/// Errors raised by a generative model call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("model API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The API returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The response body did not have the expected shape.
    #[error("unexpected model response: {0}")]
    Parse(String),

    /// The client is missing its endpoint, key, or model.
    #[error("model not configured: {0}")]
    NotConfigured(String),
}

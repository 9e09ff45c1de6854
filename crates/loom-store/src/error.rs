//! Artifact store error types.

use thiserror::Error;

/// Errors raised while writing or reading compiled artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object store rejected the request (transport, permission, quota).
    #[error("object store error: {0}")]
    Backend(#[from] object_store::Error),

    /// No artifact exists for the lesson.
    #[error("artifact not found: {key}")]
    NotFound {
        /// Object key that was looked up.
        key: String,
    },

    /// The selected backend is missing required settings.
    #[error("storage backend not configured: {0}")]
    NotConfigured(String),

    /// Stored bytes are not a UTF-8 module.
    #[error("artifact {key} is not valid UTF-8")]
    InvalidContent {
        /// Object key that was read.
        key: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

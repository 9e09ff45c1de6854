//! Lesson database errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A row could not be decoded into a lesson.
    #[error("Query failed: {0}")]
    Query(String),

    /// The embedded schema could not be applied.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// No lesson matched the lookup.
    #[error("No result returned")]
    NoResult,

    /// The lesson is not in a status the write allows (retry of a lesson that
    /// is not `failed`).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

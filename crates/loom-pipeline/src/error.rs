//! Pipeline error types.

use loom_db::DatabaseError;
use thiserror::Error;

/// Errors that end a run or a trigger without a recorded outcome.
///
/// Attempt failures are not errors here: they are recorded on the run
/// context and, on exhaustion, persisted as the lesson's error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The final `completed` / `failed` write did not land.
    #[error("failed to persist final status for lesson {lesson_id}: {source}")]
    FinalWrite {
        lesson_id: String,
        #[source]
        source: DatabaseError,
    },

    /// A manual retry was requested for a lesson that is not `failed`.
    #[error("{0}")]
    RetryRejected(String),

    #[error("Lesson not found: {0}")]
    LessonNotFound(String),

    /// The job queue has no running consumer.
    #[error("job queue is closed")]
    QueueClosed,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

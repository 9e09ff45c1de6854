//! Manual retry trigger.

use loom_core::GenerateLessonEvent;
use loom_db::{DatabaseError, LessonDb, RunClaim};

use crate::error::PipelineError;
use crate::runner::EventSink;

/// Reset a `failed` lesson to `pending` and emit a retry event carrying its
/// previous error.
///
/// If the event cannot be delivered, the lesson is put back to `failed` with
/// its previous error, so it stays retryable.
///
/// # Errors
///
/// Returns [`PipelineError::RetryRejected`] when the lesson is not `failed`,
/// [`PipelineError::LessonNotFound`] when it does not exist, and
/// [`PipelineError::QueueClosed`] when the event cannot be delivered.
pub async fn request_retry<S: EventSink>(
    db: &LessonDb,
    sink: &S,
    lesson_id: &str,
) -> Result<GenerateLessonEvent, PipelineError> {
    let ticket = db.reset_for_retry(lesson_id).await.map_err(|e| match e {
        DatabaseError::InvalidState(msg) => PipelineError::RetryRejected(msg),
        DatabaseError::NoResult => PipelineError::LessonNotFound(lesson_id.to_string()),
        other => PipelineError::Database(other),
    })?;

    let event = GenerateLessonEvent::retry(&ticket.lesson, ticket.previous_error, ticket.run_token);
    if let Err(error) = sink.emit(event.clone()).await {
        restore_failed(db, &event).await;
        return Err(error);
    }
    tracing::info!(lesson_id, "retry triggered");
    Ok(event)
}

/// Undo a reset whose retry event was never delivered. Only the reset's own
/// token can match, so a run that claimed the lesson since is left alone.
async fn restore_failed(db: &LessonDb, event: &GenerateLessonEvent) {
    let lesson_id = event.lesson_id.as_str();
    let Some(run_token) = event.run_token.as_deref() else {
        return;
    };
    let error = event
        .previous_error
        .as_deref()
        .unwrap_or("retry could not be queued");
    match db.fail_run(lesson_id, run_token, RunClaim::Held, error).await {
        Ok(_) => tracing::warn!(lesson_id, "retry not delivered; lesson restored to failed"),
        Err(e) => {
            tracing::error!(lesson_id, error = %e, "failed to restore lesson after undelivered retry");
        }
    }
}

//! Lesson repository: creation, lookup, and run-scoped status transitions.

use chrono::Utc;

use loom_core::ids::PREFIX_LESSON;
use loom_core::{Lesson, LessonStatus};

use crate::LessonDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};

const SELECT_COLS: &str =
    "id, title, objective, course_id, status, error, compiled_url, created_at, updated_at";

fn row_to_lesson(row: &libsql::Row) -> Result<Lesson, DatabaseError> {
    Ok(Lesson {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        objective: row.get::<String>(2)?,
        course_id: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        error: get_opt_string(row, 5)?,
        compiled_url: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

/// Fields supplied when a lesson is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub title: String,
    pub objective: String,
    pub course_id: Option<String>,
}

/// Result of a run-scoped final write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was updated.
    Applied,
    /// A newer run owns the lesson; nothing was written.
    Superseded,
}

/// Whether the writing run's token was recorded on the lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClaim {
    /// `begin_run` or `reset_for_retry` stored this run's token.
    Held,
    /// The `processing` write failed, so the lesson may still carry the token
    /// of an earlier, finished run. The final write then also lands when the
    /// lesson is in a terminal state, and still yields to a newer run that has
    /// claimed it (`pending` or `processing` under another token).
    Lost,
}

impl RunClaim {
    const fn guard(self) -> &'static str {
        match self {
            Self::Held => "(run_token IS NULL OR run_token = ?4)",
            Self::Lost => {
                "(run_token IS NULL OR run_token = ?4 OR status NOT IN ('pending', 'processing'))"
            }
        }
    }
}

/// Returned by [`LessonDb::reset_for_retry`]: everything needed to emit the
/// retry trigger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryTicket {
    /// The lesson as it is after the reset (status `pending`).
    pub lesson: Lesson,
    /// The failure message that was cleared.
    pub previous_error: Option<String>,
    /// Token of the run the retry starts.
    pub run_token: String,
}

impl LessonDb {
    /// Create a lesson in state `pending`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_lesson(&self, new: &NewLesson) -> Result<Lesson, DatabaseError> {
        let now = Utc::now();
        let id = self.generate_id(PREFIX_LESSON).await?;

        self.conn()
            .execute(
                "INSERT INTO lessons (id, title, objective, course_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)",
                libsql::params![
                    id.as_str(),
                    new.title.as_str(),
                    new.objective.as_str(),
                    new.course_id.as_deref(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        tracing::debug!(lesson_id = %id, "lesson created");

        Ok(Lesson {
            id,
            title: new.title.clone(),
            objective: new.objective.clone(),
            course_id: new.course_id.clone(),
            status: LessonStatus::Pending,
            error: None,
            compiled_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist.
    pub async fn get_lesson(&self, id: &str) -> Result<Lesson, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM lessons WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lesson(&row)
    }

    /// List lessons, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_lessons(
        &self,
        status: Option<LessonStatus>,
        limit: u32,
    ) -> Result<Vec<Lesson>, DatabaseError> {
        let mut rows = match status {
            Some(status) => {
                self.conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM lessons WHERE status = ?1
                             ORDER BY created_at DESC, id LIMIT ?2"
                        ),
                        libsql::params![status.as_str(), i64::from(limit)],
                    )
                    .await?
            }
            None => {
                self.conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM lessons
                             ORDER BY created_at DESC, id LIMIT ?1"
                        ),
                        libsql::params![i64::from(limit)],
                    )
                    .await?
            }
        };

        let mut lessons = Vec::new();
        while let Some(row) = rows.next().await? {
            lessons.push(row_to_lesson(&row)?);
        }
        Ok(lessons)
    }

    /// Token of the run currently allowed to write the final status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist.
    pub async fn current_run_token(&self, id: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT run_token FROM lessons WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_opt_string(&row, 0)
    }

    /// Enter `processing` and claim the lesson for the run holding `run_token`.
    ///
    /// Clears any previous error and artifact address so the record invariants
    /// hold while the run is in flight.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist.
    pub async fn begin_run(&self, id: &str, run_token: &str) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let changed = self
            .conn()
            .execute(
                "UPDATE lessons
                 SET status = 'processing', error = NULL, compiled_url = NULL,
                     run_token = ?1, updated_at = ?2
                 WHERE id = ?3",
                libsql::params![run_token, now.to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Persist a successful run: `completed`, the artifact address, no error.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist.
    pub async fn complete_run(
        &self,
        id: &str,
        run_token: &str,
        claim: RunClaim,
        compiled_url: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "UPDATE lessons
             SET status = 'completed', compiled_url = ?1, error = NULL,
                 run_token = ?4, updated_at = ?2
             WHERE id = ?3 AND {}",
            claim.guard()
        );
        let changed = self
            .conn()
            .execute(
                &sql,
                libsql::params![compiled_url, now.to_rfc3339(), id, run_token],
            )
            .await?;
        self.write_outcome(id, changed).await
    }

    /// Persist an exhausted run: `failed` with the most recent error.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist.
    pub async fn fail_run(
        &self,
        id: &str,
        run_token: &str,
        claim: RunClaim,
        error: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "UPDATE lessons
             SET status = 'failed', error = ?1, compiled_url = NULL,
                 run_token = ?4, updated_at = ?2
             WHERE id = ?3 AND {}",
            claim.guard()
        );
        let changed = self
            .conn()
            .execute(&sql, libsql::params![error, now.to_rfc3339(), id, run_token])
            .await?;
        self.write_outcome(id, changed).await
    }

    /// Reset a `failed` lesson to `pending` and hand out a new run token.
    ///
    /// The reset is a single conditional UPDATE, so a lesson that is not
    /// `failed` at write time is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the lesson does not exist and
    /// `DatabaseError::InvalidState` if it is not `failed`.
    pub async fn reset_for_retry(&self, id: &str) -> Result<RetryTicket, DatabaseError> {
        let current = self.get_lesson(id).await?;
        if !current.status.can_transition_to(LessonStatus::Pending) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot retry lesson {id}: status is {}, expected failed",
                current.status
            )));
        }

        let run_token = self.generate_run_token().await?;
        let now = Utc::now();
        let changed = self
            .conn()
            .execute(
                "UPDATE lessons
                 SET status = 'pending', error = NULL, run_token = ?1, updated_at = ?2
                 WHERE id = ?3 AND status = 'failed'",
                libsql::params![run_token.as_str(), now.to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot retry lesson {id}: status changed concurrently"
            )));
        }

        tracing::info!(lesson_id = id, "lesson reset for retry");

        Ok(RetryTicket {
            lesson: Lesson {
                status: LessonStatus::Pending,
                error: None,
                updated_at: now,
                ..current.clone()
            },
            previous_error: current.error,
            run_token,
        })
    }

    async fn write_outcome(&self, id: &str, changed: u64) -> Result<WriteOutcome, DatabaseError> {
        if changed > 0 {
            return Ok(WriteOutcome::Applied);
        }
        // Distinguish a missing row from a token mismatch.
        self.get_lesson(id).await?;
        tracing::warn!(lesson_id = id, "final write skipped: run superseded");
        Ok(WriteOutcome::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn test_db() -> LessonDb {
        LessonDb::open_local(":memory:").await.unwrap()
    }

    fn levers() -> NewLesson {
        NewLesson {
            title: "Intro to Levers".into(),
            objective: "Explain mechanical advantage".into(),
            course_id: Some("course-physics".into()),
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        assert_eq!(lesson.status, LessonStatus::Pending);

        let fetched = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(fetched.title, "Intro to Levers");
        assert_eq!(fetched.course_id.as_deref(), Some("course-physics"));
        assert!(fetched.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn get_missing_is_no_result() {
        let db = test_db().await;
        let err = db.get_lesson("lsn-00000000").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let db = test_db().await;
        let a = db.create_lesson(&levers()).await.unwrap();
        db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&a.id, "0000000000000001").await.unwrap();

        assert_eq!(db.list_lessons(None, 10).await.unwrap().len(), 2);
        let processing = db
            .list_lessons(Some(LessonStatus::Processing), 10)
            .await
            .unwrap();
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id, a.id);
        assert_eq!(db.list_lessons(None, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn complete_run_sets_address_and_clears_error() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();

        let outcome = db
            .complete_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "http://host/a.js")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);

        let done = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(done.status, LessonStatus::Completed);
        assert_eq!(done.compiled_url.as_deref(), Some("http://host/a.js"));
        assert_eq!(done.error, None);
        assert!(done.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn fail_run_records_error() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();
        db.fail_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "Compile error: 1:1: boom")
            .await
            .unwrap();

        let failed = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(failed.status, LessonStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("Compile error: 1:1: boom"));
        assert!(failed.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn stale_token_is_superseded() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();
        db.begin_run(&lesson.id, "bbbbbbbbbbbbbbbb").await.unwrap();

        let outcome = db
            .complete_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "http://host/stale.js")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Superseded);
        let still = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(still.status, LessonStatus::Processing);
        assert_eq!(still.compiled_url, None);
    }

    #[tokio::test]
    async fn final_write_accepted_when_no_token_recorded() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        let outcome = db
            .fail_run(
                &lesson.id,
                "cccccccccccccccc",
                RunClaim::Held,
                "model did not generate LessonComponent",
            )
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
    }

    #[tokio::test]
    async fn lost_claim_lands_over_finished_run() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();
        db.fail_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "boom")
            .await
            .unwrap();

        let outcome = db
            .complete_run(&lesson.id, "dddddddddddddddd", RunClaim::Held, "http://host/a.js")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Superseded);

        let outcome = db
            .complete_run(&lesson.id, "dddddddddddddddd", RunClaim::Lost, "http://host/a.js")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
        let done = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(done.status, LessonStatus::Completed);
        assert_eq!(done.error, None);
        assert_eq!(
            db.current_run_token(&lesson.id).await.unwrap().as_deref(),
            Some("dddddddddddddddd")
        );
    }

    #[tokio::test]
    async fn lost_claim_yields_to_newer_run() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "bbbbbbbbbbbbbbbb").await.unwrap();

        let outcome = db
            .fail_run(&lesson.id, "dddddddddddddddd", RunClaim::Lost, "late")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Superseded);
        let still = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(still.status, LessonStatus::Processing);
        assert_eq!(still.error, None);
    }

    #[tokio::test]
    async fn final_write_on_missing_lesson_is_no_result() {
        let db = test_db().await;
        let err = db
            .complete_run("lsn-00000000", "aaaaaaaaaaaaaaaa", RunClaim::Held, "http://x")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn reset_for_retry_requires_failed() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();

        let err = db.reset_for_retry(&lesson.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        // The running job's final write is unaffected.
        let outcome = db
            .complete_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "http://host/a.js")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);
    }

    #[tokio::test]
    async fn reset_for_retry_clears_error_and_rotates_token() {
        let db = test_db().await;
        let lesson = db.create_lesson(&levers()).await.unwrap();
        db.begin_run(&lesson.id, "aaaaaaaaaaaaaaaa").await.unwrap();
        db.fail_run(
            &lesson.id,
            "aaaaaaaaaaaaaaaa",
            RunClaim::Held,
            "mismatched braces: 3 opening vs 2 closing",
        )
        .await
        .unwrap();

        let ticket = db.reset_for_retry(&lesson.id).await.unwrap();
        assert_eq!(
            ticket.previous_error.as_deref(),
            Some("mismatched braces: 3 opening vs 2 closing")
        );
        assert_eq!(ticket.lesson.status, LessonStatus::Pending);
        assert_ne!(ticket.run_token, "aaaaaaaaaaaaaaaa");

        let stored = db.get_lesson(&lesson.id).await.unwrap();
        assert_eq!(stored.status, LessonStatus::Pending);
        assert_eq!(stored.error, None);
        assert_eq!(
            db.current_run_token(&lesson.id).await.unwrap().as_deref(),
            Some(ticket.run_token.as_str())
        );

        // The old run can no longer land a result.
        let outcome = db
            .fail_run(&lesson.id, "aaaaaaaaaaaaaaaa", RunClaim::Held, "late")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Superseded);
    }
}

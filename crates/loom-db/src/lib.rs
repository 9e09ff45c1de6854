//! # loom-db
//!
//! libSQL persistence for lesson records.
//!
//! Every status change is a single `UPDATE`, so the record invariants
//! (address iff completed, error iff failed) hold at every point a concurrent
//! observer can read. Final writes of a run are guarded by the run token
//! recorded when the run started.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

pub use error::DatabaseError;
pub use repos::lesson::{NewLesson, RetryTicket, RunClaim, WriteOutcome};

use libsql::Builder;
use loom_core::ids::RUN_TOKEN_LEN;

/// Central database handle for lesson state.
pub struct LessonDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LessonDb {
    /// Open a local database at the given path. `":memory:"` is accepted.
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let lesson_db = Self { db, conn };
        lesson_db.run_migrations().await?;
        tracing::debug!(path, "lesson database opened");
        Ok(lesson_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"lsn-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Generate a fresh run token (16 lowercase hex characters).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_run_token(&self) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT lower(hex(randomblob({})))", RUN_TOKEN_LEN / 2),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::ids::{is_lesson_id, is_run_token, PREFIX_LESSON};

    async fn test_db() -> LessonDb {
        LessonDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                ["lessons"],
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id(PREFIX_LESSON).await.unwrap();
        assert!(is_lesson_id(&id), "unexpected id: {id}");
        assert_eq!(id.len(), 12);
    }

    #[tokio::test]
    async fn run_tokens_are_unique() {
        let db = test_db().await;
        let a = db.generate_run_token().await.unwrap();
        let b = db.generate_run_token().await.unwrap();
        assert!(is_run_token(&a), "unexpected token: {a}");
        assert_ne!(a, b);
    }
}

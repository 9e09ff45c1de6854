//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on open.
//! All statements use `IF NOT EXISTS` so re-running is harmless.

use crate::LessonDb;
use crate::error::DatabaseError;

const MIGRATION_001: &str = include_str!("../migrations/001_lessons.sql");

impl LessonDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_lessons: {e}")))?;
        Ok(())
    }
}

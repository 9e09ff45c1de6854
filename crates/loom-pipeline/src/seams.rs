//! Storage seams the orchestrator writes through.
//!
//! Production runs use [`LessonDb`] and [`ArtifactStore`]; tests wrap them to
//! inject failures.

use std::future::Future;
use std::sync::Arc;

use loom_db::{DatabaseError, LessonDb, RunClaim, WriteOutcome};
use loom_store::{ArtifactStore, StoreError};

/// Run-scoped lesson status writes.
pub trait LessonStore: Send + Sync {
    fn new_run_token(&self) -> impl Future<Output = Result<String, DatabaseError>> + Send;

    fn begin_run(
        &self,
        lesson_id: &str,
        run_token: &str,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send;

    fn complete_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        address: &str,
    ) -> impl Future<Output = Result<WriteOutcome, DatabaseError>> + Send;

    fn fail_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        error: &str,
    ) -> impl Future<Output = Result<WriteOutcome, DatabaseError>> + Send;
}

/// Destination for compiled artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Upsert the artifact for `lesson_id` and return its address.
    fn put(
        &self,
        lesson_id: &str,
        compiled: &str,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

impl LessonStore for LessonDb {
    async fn new_run_token(&self) -> Result<String, DatabaseError> {
        self.generate_run_token().await
    }

    async fn begin_run(&self, lesson_id: &str, run_token: &str) -> Result<(), DatabaseError> {
        Self::begin_run(self, lesson_id, run_token).await
    }

    async fn complete_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        address: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        Self::complete_run(self, lesson_id, run_token, claim, address).await
    }

    async fn fail_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        error: &str,
    ) -> Result<WriteOutcome, DatabaseError> {
        Self::fail_run(self, lesson_id, run_token, claim, error).await
    }
}

impl<T: LessonStore> LessonStore for Arc<T> {
    fn new_run_token(&self) -> impl Future<Output = Result<String, DatabaseError>> + Send {
        (**self).new_run_token()
    }

    fn begin_run(
        &self,
        lesson_id: &str,
        run_token: &str,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send {
        (**self).begin_run(lesson_id, run_token)
    }

    fn complete_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        address: &str,
    ) -> impl Future<Output = Result<WriteOutcome, DatabaseError>> + Send {
        (**self).complete_run(lesson_id, run_token, claim, address)
    }

    fn fail_run(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        error: &str,
    ) -> impl Future<Output = Result<WriteOutcome, DatabaseError>> + Send {
        (**self).fail_run(lesson_id, run_token, claim, error)
    }
}

impl ArtifactSink for ArtifactStore {
    async fn put(&self, lesson_id: &str, compiled: &str) -> Result<String, StoreError> {
        Self::put(self, lesson_id, compiled).await
    }
}

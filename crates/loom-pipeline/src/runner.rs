//! In-process job queue for `lesson.generate` events.
//!
//! A [`JobQueue`] is the sending half; a [`JobRunner`] consumes events one at
//! a time and hands each to the orchestrator. The runner stops once every
//! queue handle has been dropped.

use std::future::Future;
use std::sync::Arc;

use loom_core::GenerateLessonEvent;
use loom_core::event::EVENT_NAME;
use loom_model::GenerativeModel;
use tokio::sync::mpsc;

use crate::error::PipelineError;
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::seams::{ArtifactSink, LessonStore};

/// Something that accepts trigger events.
pub trait EventSink: Send + Sync {
    fn emit(
        &self,
        event: GenerateLessonEvent,
    ) -> impl Future<Output = Result<(), PipelineError>> + Send;
}

/// Sending half of the job channel.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<GenerateLessonEvent>,
}

impl EventSink for JobQueue {
    async fn emit(&self, event: GenerateLessonEvent) -> Result<(), PipelineError> {
        tracing::debug!(event = EVENT_NAME, lesson_id = %event.lesson_id, is_retry = event.is_retry, "event emitted");
        self.tx.send(event).await.map_err(|_| PipelineError::QueueClosed)
    }
}

/// Consumes queued events sequentially.
pub struct JobRunner<M, L, A> {
    rx: mpsc::Receiver<GenerateLessonEvent>,
    orchestrator: Arc<Orchestrator<M, L, A>>,
}

impl<M, L, A> JobRunner<M, L, A>
where
    M: GenerativeModel,
    L: LessonStore,
    A: ArtifactSink,
{
    /// Create a runner and the queue that feeds it.
    pub fn new(orchestrator: Arc<Orchestrator<M, L, A>>, capacity: usize) -> (JobQueue, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (JobQueue { tx }, Self { rx, orchestrator })
    }

    /// Process events until all queues are dropped. Returns the outcome of
    /// every run that reached a final write, in processing order.
    pub async fn run(mut self) -> Vec<(String, RunOutcome)> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.rx.recv().await {
            match self.orchestrator.run(&event).await {
                Ok(outcome) => outcomes.push((event.lesson_id, outcome)),
                Err(e) => {
                    tracing::error!(lesson_id = %event.lesson_id, error = %e, "generation run errored");
                }
            }
        }
        tracing::debug!(runs = outcomes.len(), "job runner stopped");
        outcomes
    }
}

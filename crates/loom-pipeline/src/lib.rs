//! # loom-pipeline
//!
//! Turns a `lesson.generate` event into a stored, compiled artifact:
//!
//! - [`Orchestrator`] runs the bounded, self-correcting retry loop
//! - [`context`] holds the run context and the pure prompt selection
//! - [`prompts`] renders the prompt variants
//! - [`request_retry`] is the manual retry trigger
//! - [`JobQueue`] / [`JobRunner`] deliver events in-process

pub mod context;
mod error;
pub mod orchestrator;
pub mod prompts;
mod retry;
mod runner;
mod seams;

pub use context::{PromptVariant, RunContext, select_prompt};
pub use error::PipelineError;
pub use orchestrator::{Attempt, NO_ENTRY_MESSAGE, Orchestrator, RunOutcome, RunSettings};
pub use retry::request_retry;
pub use runner::{EventSink, JobQueue, JobRunner};
pub use seams::{ArtifactSink, LessonStore};

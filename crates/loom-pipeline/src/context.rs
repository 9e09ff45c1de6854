//! Run context and prompt selection.
//!
//! A [`RunContext`] is the only state carried between attempts of a run.
//! [`select_prompt`] is a pure function of it.

use std::fmt;

use loom_core::GenerateLessonEvent;

use crate::prompts;

/// Which prompt an attempt uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptVariant {
    /// Attempt 1 of a fresh run.
    FirstAttempt,
    /// Attempt 1 of a manual retry that carries the previous run's error.
    RetryWithContext,
    /// Attempt k > 1: previous error plus the source that produced it.
    ErrorFeedback,
}

impl PromptVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstAttempt => "first_attempt",
            Self::RetryWithContext => "retry_with_context",
            Self::ErrorFeedback => "error_feedback",
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State threaded through the attempts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub lesson_id: String,
    pub title: String,
    pub objective: String,
    /// Failure carried in by a manual retry.
    pub retry_error: Option<String>,
    /// Index of the current attempt, 1-based. 0 before the first attempt.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Most recent attempt error.
    pub last_error: Option<String>,
    /// Source the most recent failed attempt produced: the normalized source
    /// when normalization succeeded, otherwise the raw model output.
    pub last_source: Option<String>,
}

impl RunContext {
    #[must_use]
    pub fn from_event(event: &GenerateLessonEvent, max_attempts: u32) -> Self {
        Self {
            lesson_id: event.lesson_id.clone(),
            title: event.title.clone(),
            objective: event.objective.clone(),
            retry_error: event.retry_context().map(str::to_string),
            attempt: 0,
            max_attempts: max_attempts.max(1),
            last_error: None,
            last_source: None,
        }
    }

    #[must_use]
    pub const fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Advance to the next attempt and return its index.
    pub const fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// Record a failed attempt. Only the most recent failure is kept.
    pub fn record_failure(&mut self, error: String, source: Option<String>) {
        self.last_error = Some(error);
        self.last_source = source.filter(|s| !s.trim().is_empty());
    }
}

/// Choose the prompt for the current attempt of `ctx`.
#[must_use]
pub fn select_prompt(ctx: &RunContext) -> (PromptVariant, String) {
    if ctx.attempt > 1 {
        if let Some(error) = &ctx.last_error {
            return match &ctx.last_source {
                Some(source) => (
                    PromptVariant::ErrorFeedback,
                    prompts::error_feedback(error, source),
                ),
                // Nothing to fix: restate the contract with the error up front.
                None => (
                    PromptVariant::RetryWithContext,
                    prompts::retry_with_context(error, &ctx.title, &ctx.objective),
                ),
            };
        }
    }

    match &ctx.retry_error {
        Some(error) => (
            PromptVariant::RetryWithContext,
            prompts::retry_with_context(error, &ctx.title, &ctx.objective),
        ),
        None => (
            PromptVariant::FirstAttempt,
            prompts::first_attempt(&ctx.title, &ctx.objective),
        ),
    }
}

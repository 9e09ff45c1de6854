//! The generation orchestrator: one run of the retry state machine.
//!
//! ```text
//! pending ──▶ processing ──▶ completed
//!                  │
//!                  └───────▶ failed ──(manual retry)──▶ pending
//! ```
//!
//! Attempts are strictly sequential. Each one runs
//! model → normalize → validate → transpile → store; any stage failure is
//! recorded on the [`RunContext`] and feeds the next attempt's prompt.

use loom_config::LoomConfig;
use loom_core::GenerateLessonEvent;
use loom_db::{RunClaim, WriteOutcome};
use loom_model::{GenerativeModel, ModelRequest, Tool};

use crate::context::{PromptVariant, RunContext, select_prompt};
use crate::error::PipelineError;
use crate::seams::{ArtifactSink, LessonStore};

/// Recorded when the model returns no text at all (for example after
/// spending its step budget on tool calls).
pub const NO_ENTRY_MESSAGE: &str = "model did not return the expected entry construct";

/// Per-run limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub max_attempts: u32,
    pub max_output_tokens: u32,
    pub max_steps: u32,
    pub tools: Vec<Tool>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            max_output_tokens: 10_000,
            max_steps: 4,
            tools: Tool::ALL.to_vec(),
        }
    }
}

impl RunSettings {
    #[must_use]
    pub fn from_config(config: &LoomConfig) -> Self {
        Self {
            max_attempts: config.general.max_attempts,
            max_output_tokens: config.model.max_output_tokens,
            max_steps: config.model.max_steps,
            tools: Tool::ALL.to_vec(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { address: String, attempts: u32 },
    Failed { error: String, attempts: u32 },
    /// A newer run claimed the lesson; this run's result was not written.
    Superseded { attempts: u32 },
}

/// Transient record of one attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub index: u32,
    pub variant: PromptVariant,
    pub raw_output: String,
    pub normalized: Option<String>,
    pub address: Option<String>,
    /// Stage that failed and its message.
    pub failure: Option<(&'static str, String)>,
}

impl Attempt {
    const fn new(index: u32, variant: PromptVariant) -> Self {
        Self {
            index,
            variant,
            raw_output: String::new(),
            normalized: None,
            address: None,
            failure: None,
        }
    }

    fn failed(mut self, stage: &'static str, message: String) -> Self {
        self.failure = Some((stage, message));
        self
    }

    /// Source to show the model in an error-feedback prompt.
    fn feedback_source(&self) -> String {
        self.normalized
            .clone()
            .unwrap_or_else(|| self.raw_output.clone())
    }
}

/// Drives generation runs for lessons.
pub struct Orchestrator<M, L, A> {
    model: M,
    lessons: L,
    artifacts: A,
    settings: RunSettings,
}

impl<M, L, A> Orchestrator<M, L, A>
where
    M: GenerativeModel,
    L: LessonStore,
    A: ArtifactSink,
{
    pub const fn new(model: M, lessons: L, artifacts: A, settings: RunSettings) -> Self {
        Self {
            model,
            lessons,
            artifacts,
            settings,
        }
    }

    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Execute one run for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FinalWrite`] when the `completed` / `failed`
    /// status cannot be persisted, or [`PipelineError::Database`] when no run
    /// token can be allocated. A failed `processing` write is only logged.
    pub async fn run(&self, event: &GenerateLessonEvent) -> Result<RunOutcome, PipelineError> {
        let lesson_id = event.lesson_id.as_str();
        let run_token = match &event.run_token {
            Some(token) => token.clone(),
            None => self.lessons.new_run_token().await?,
        };

        tracing::info!(
            lesson_id,
            is_retry = event.is_retry,
            max_attempts = self.settings.max_attempts,
            "generation run started"
        );
        // A retry's token was already recorded by the reset.
        let claim = match self.lessons.begin_run(lesson_id, &run_token).await {
            Ok(()) => RunClaim::Held,
            Err(e) => {
                tracing::warn!(lesson_id, error = %e, "failed to mark lesson processing");
                if event.run_token.is_some() {
                    RunClaim::Held
                } else {
                    RunClaim::Lost
                }
            }
        };

        let mut ctx = RunContext::from_event(event, self.settings.max_attempts);
        while ctx.has_attempts_left() {
            let index = ctx.begin_attempt();
            let (variant, prompt) = select_prompt(&ctx);
            tracing::info!(lesson_id, attempt = index, %variant, "attempt started");

            let attempt = self.attempt(&ctx, variant, prompt).await;
            if let Some(address) = attempt.address {
                return self
                    .finish_completed(lesson_id, &run_token, claim, address, index)
                    .await;
            }
            if let Some((stage, message)) = &attempt.failure {
                tracing::warn!(lesson_id, attempt = index, stage, error = %message, "attempt failed");
                ctx.record_failure(message.clone(), Some(attempt.feedback_source()));
            }
        }

        let error = ctx
            .last_error
            .clone()
            .unwrap_or_else(|| String::from(NO_ENTRY_MESSAGE));
        tracing::error!(lesson_id, attempts = ctx.attempt, %error, "generation exhausted all attempts");
        let outcome = self
            .lessons
            .fail_run(lesson_id, &run_token, claim, &error)
            .await
            .map_err(|source| PipelineError::FinalWrite {
                lesson_id: lesson_id.to_string(),
                source,
            })?;
        Ok(match outcome {
            WriteOutcome::Applied => RunOutcome::Failed {
                error,
                attempts: ctx.attempt,
            },
            WriteOutcome::Superseded => RunOutcome::Superseded {
                attempts: ctx.attempt,
            },
        })
    }

    async fn attempt(&self, ctx: &RunContext, variant: PromptVariant, prompt: String) -> Attempt {
        let attempt = Attempt::new(ctx.attempt, variant);
        let request = ModelRequest::new(prompt)
            .with_tools(&self.settings.tools)
            .with_limits(self.settings.max_output_tokens, self.settings.max_steps);

        let response = match self.model.generate(&request).await {
            Ok(response) => response,
            Err(e) => return attempt.failed("model", format!("Model error: {e}")),
        };
        if !response.tool_results.is_empty() {
            tracing::debug!(
                lesson_id = %ctx.lesson_id,
                tools = response.tool_results.len(),
                "model used tools"
            );
        }

        let mut attempt = Attempt {
            raw_output: response.text,
            ..attempt
        };
        if attempt.raw_output.trim().is_empty() {
            return attempt.failed("model", String::from(NO_ENTRY_MESSAGE));
        }

        let normalized = match loom_compiler::normalize(&attempt.raw_output) {
            Ok(source) => source,
            Err(e) => return attempt.failed(e.stage(), e.to_string()),
        };
        attempt.normalized = Some(normalized);
        let source = attempt.normalized.as_deref().unwrap_or_default();

        if let Err(e) = loom_compiler::validate(source) {
            return attempt.failed(e.stage(), e.to_string());
        }
        let code = match loom_compiler::transpile(source) {
            Ok(code) => code,
            Err(e) => return attempt.failed(e.stage(), e.to_string()),
        };

        match self.artifacts.put(&ctx.lesson_id, &code).await {
            Ok(address) => {
                attempt.address = Some(address);
                attempt
            }
            Err(e) => attempt.failed("store", format!("Upload error: {e}")),
        }
    }

    async fn finish_completed(
        &self,
        lesson_id: &str,
        run_token: &str,
        claim: RunClaim,
        address: String,
        attempts: u32,
    ) -> Result<RunOutcome, PipelineError> {
        let outcome = self
            .lessons
            .complete_run(lesson_id, run_token, claim, &address)
            .await
            .map_err(|source| PipelineError::FinalWrite {
                lesson_id: lesson_id.to_string(),
                source,
            })?;
        match outcome {
            WriteOutcome::Applied => {
                tracing::info!(lesson_id, attempts, %address, "lesson completed");
                Ok(RunOutcome::Completed { address, attempts })
            }
            WriteOutcome::Superseded => Ok(RunOutcome::Superseded { attempts }),
        }
    }
}

//! # loom-model
//!
//! The generative model seam used by the orchestrator.
//!
//! [`GenerativeModel`] takes a prompt plus limits and returns the final text
//! and any tool results. [`HttpModel`] implements it against an
//! OpenAI-compatible chat-completions API with one tool, `generate_diagram`.

mod client;
mod error;
mod http;
pub mod tools;

use std::future::Future;
use std::sync::Arc;

pub use client::HttpModel;
pub use error::ModelError;
pub use tools::{Tool, ToolResult};

/// One model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub prompt: String,
    /// Tools the model may call. Empty disables tool use.
    pub tools: Vec<Tool>,
    /// Output-size limit per model call.
    pub max_output_tokens: u32,
    /// Maximum number of model turns, counting turns spent on tool calls.
    pub max_steps: u32,
}

impl ModelRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tools: Vec::new(),
            max_output_tokens: 10_000,
            max_steps: 1,
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: &[Tool]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, max_output_tokens: u32, max_steps: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.max_steps = max_steps;
        self
    }
}

/// What the model produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// Final text. Empty when the step budget ran out during tool use.
    pub text: String,
    pub tool_results: Vec<ToolResult>,
    /// Model turns used.
    pub steps: u32,
}

impl ModelResponse {
    /// Plain text response with no tool use.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_results: Vec::new(),
            steps: 1,
        }
    }
}

/// A model that turns a prompt into text.
pub trait GenerativeModel: Send + Sync {
    /// Run one generation, including any bounded tool use.
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}

impl<T: GenerativeModel> GenerativeModel for Arc<T> {
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send {
        (**self).generate(request)
    }
}

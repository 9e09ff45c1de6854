//! Generative model endpoint configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("https://api.openai.com/v1")
}

fn default_model() -> String {
    String::from("gpt-4o")
}

const fn default_temperature() -> f32 {
    0.6
}

const fn default_max_output_tokens() -> u32 {
    10_000
}

const fn default_max_steps() -> u32 {
    4
}

const fn default_timeout_secs() -> u64 {
    180
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat-completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the API.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier used for lesson generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used by the diagram tool. Falls back to `model` when empty.
    #[serde(default)]
    pub diagram_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output-size limit per model call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Step budget for tool use within one model call.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            diagram_model: String::new(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_steps: default_max_steps(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Check if an API key and model are present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.model.is_empty() && !self.base_url.is_empty()
    }

    /// Model used for auxiliary diagram generation.
    pub fn diagram_model(&self) -> &str {
        if self.diagram_model.is_empty() {
            &self.model
        } else {
            &self.diagram_model
        }
    }
}

//! OpenAI-compatible chat-completions client with bounded tool use.

use std::time::Duration;

use loom_config::ModelConfig;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::http::check_response;
use crate::tools::{DiagramArgs, Tool, ToolResult, diagram_prompt, strip_fence};
use crate::{GenerativeModel, ModelRequest, ModelResponse};

/// Output-size limit for the auxiliary diagram call.
const DIAGRAM_MAX_TOKENS: u32 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Message {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn user(content: &str) -> Self {
        Self {
            role: String::from("user"),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool(call_id: &str, content: &str) -> Self {
        Self {
            role: String::from("tool"),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    String::from("function")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

fn tool_definition(tool: Tool) -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name(),
            "description": tool.description(),
            "parameters": tool.parameters(),
        }
    })
}

/// Generative model reached over an OpenAI-compatible HTTP API.
pub struct HttpModel {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    diagram_model: String,
    temperature: f32,
}

impl HttpModel {
    /// Build a client from the `[model]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotConfigured`] when the key, model, or base URL
    /// is missing, or [`ModelError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        if !config.is_configured() {
            return Err(ModelError::NotConfigured(String::from(
                "set model.api_key (LOOM_MODEL__API_KEY)",
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent("loom/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            diagram_model: config.diagram_model().to_string(),
            temperature: config.temperature,
        })
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: u32,
    ) -> Result<Message, ModelError> {
        let body = ChatRequest {
            model,
            messages,
            temperature: self.temperature,
            max_tokens,
            tools: tools.iter().copied().map(tool_definition).collect(),
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ModelError::Parse(String::from("response has no choices")))
    }

    /// Execute one tool call. Failures are reported back to the model as
    /// the tool's output rather than failing the generation.
    async fn run_tool(&self, call: &ToolCall) -> ToolResult {
        let output = match Tool::from_name(&call.function.name) {
            Some(Tool::GenerateDiagram) => self.generate_diagram(&call.function.arguments).await,
            None => Err(format!("unknown tool {}", call.function.name)),
        };
        let output = output.unwrap_or_else(|e| {
            tracing::warn!(tool = %call.function.name, error = %e, "tool call failed");
            format!("error: {e}")
        });
        ToolResult {
            tool: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
            output,
        }
    }

    async fn generate_diagram(&self, arguments: &str) -> Result<String, String> {
        let args: DiagramArgs =
            serde_json::from_str(arguments).map_err(|e| format!("invalid arguments: {e}"))?;
        let reply = self
            .chat(
                &self.diagram_model,
                &[Message::user(&diagram_prompt(&args))],
                &[],
                DIAGRAM_MAX_TOKENS,
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(strip_fence(reply.content.as_deref().unwrap_or_default()))
    }
}

impl GenerativeModel for HttpModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let max_steps = request.max_steps.max(1);
        let mut messages = vec![Message::user(&request.prompt)];
        let mut tool_results = Vec::new();

        for step in 1..=max_steps {
            let reply = self
                .chat(&self.model, &messages, &request.tools, request.max_output_tokens)
                .await?;
            let calls = reply.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                tracing::debug!(step, tools = tool_results.len(), "model answered");
                return Ok(ModelResponse {
                    text: reply.content.unwrap_or_default(),
                    tool_results,
                    steps: step,
                });
            }

            messages.push(reply);
            for call in &calls {
                let result = self.run_tool(call).await;
                messages.push(Message::tool(&call.id, &result.output));
                tool_results.push(result);
            }
        }

        tracing::warn!(max_steps, "step budget spent on tool calls without a final answer");
        Ok(ModelResponse {
            text: String::new(),
            tool_results,
            steps: max_steps,
        })
    }
}

//! Tools a model may call while generating a lesson.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A tool offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Auxiliary model call that writes a Mermaid chart for a description.
    GenerateDiagram,
}

impl Tool {
    pub const ALL: &'static [Self] = &[Self::GenerateDiagram];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GenerateDiagram => "generate_diagram",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GenerateDiagram => {
                "Generate Mermaid diagram source for a concept, process, or relationship. \
                 Pass the result to <Mermaid chart={...} />."
            }
        }
    }

    /// JSON Schema of the tool's arguments.
    #[must_use]
    pub fn parameters(self) -> serde_json::Value {
        match self {
            Self::GenerateDiagram => json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "What the diagram should show"
                    },
                    "kind": {
                        "type": "string",
                        "enum": ["flowchart", "sequence", "class", "state", "mindmap"],
                        "description": "Mermaid diagram type"
                    }
                },
                "required": ["description"]
            }),
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tool| tool.name() == name)
    }
}

/// One executed tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    /// Name the model called, as sent.
    pub tool: String,
    /// Raw JSON arguments.
    pub arguments: String,
    /// Output handed back to the model.
    pub output: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiagramArgs {
    pub description: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Prompt for the auxiliary diagram call.
pub(crate) fn diagram_prompt(args: &DiagramArgs) -> String {
    let kind = args.kind.as_deref().unwrap_or("flowchart");
    format!(
        "Write a Mermaid {kind} diagram for: {}\n\n\
         Return only the Mermaid source. No code fences, no commentary. \
         Keep node labels short and quote labels that contain punctuation.",
        args.description
    )
}

/// Drop a surrounding code fence from Mermaid output.
pub(crate) fn strip_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

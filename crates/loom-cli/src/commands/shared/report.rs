use loom_pipeline::RunOutcome;
use serde::Serialize;

/// Serializable summary of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub lesson_id: String,
    pub outcome: &'static str,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(lesson_id: &str, outcome: RunOutcome) -> Self {
        let lesson_id = lesson_id.to_string();
        match outcome {
            RunOutcome::Completed { address, attempts } => Self {
                lesson_id,
                outcome: "completed",
                attempts,
                compiled_url: Some(address),
                error: None,
            },
            RunOutcome::Failed { error, attempts } => Self {
                lesson_id,
                outcome: "failed",
                attempts,
                compiled_url: None,
                error: Some(error),
            },
            RunOutcome::Superseded { attempts } => Self {
                lesson_id,
                outcome: "superseded",
                attempts,
                compiled_url: None,
                error: None,
            },
        }
    }
}

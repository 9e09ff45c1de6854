//! The `lesson.generate` trigger event consumed by the job runner.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lesson::Lesson;

/// Name under which generation events are emitted.
pub const EVENT_NAME: &str = "lesson.generate";

/// Trigger envelope for one generation run.
///
/// `previous_error` and `is_retry` are only set by the manual retry trigger.
/// `run_token` is filled in by the orchestrator once the run has been claimed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GenerateLessonEvent {
    pub lesson_id: String,
    pub title: String,
    pub objective: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_error: Option<String>,
    #[serde(default)]
    pub is_retry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_token: Option<String>,
}

impl GenerateLessonEvent {
    /// Build a first-run event for a freshly created lesson.
    #[must_use]
    pub fn for_lesson(lesson: &Lesson) -> Self {
        Self {
            lesson_id: lesson.id.clone(),
            title: lesson.title.clone(),
            objective: lesson.objective.clone(),
            course_id: lesson.course_id.clone(),
            previous_error: None,
            is_retry: false,
            run_token: None,
        }
    }

    /// Build a manual-retry event carrying the failure that preceded the reset.
    #[must_use]
    pub fn retry(lesson: &Lesson, previous_error: Option<String>, run_token: String) -> Self {
        Self {
            previous_error,
            is_retry: true,
            run_token: Some(run_token),
            ..Self::for_lesson(lesson)
        }
    }

    /// The prior failure, only when this is a retry that actually carries one.
    #[must_use]
    pub fn retry_context(&self) -> Option<&str> {
        if self.is_retry {
            self.previous_error.as_deref().filter(|e| !e.trim().is_empty())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_deserializes() {
        let json = r#"{"lesson_id":"lsn-1a2b3c4d","title":"Intro to Levers","objective":"torque"}"#;
        let event: GenerateLessonEvent = serde_json::from_str(json).unwrap();
        assert!(!event.is_retry);
        assert_eq!(event.previous_error, None);
        assert_eq!(event.retry_context(), None);
    }

    #[test]
    fn previous_error_ignored_without_retry_flag() {
        let json = r#"{"lesson_id":"lsn-1","title":"t","objective":"o","previous_error":"boom"}"#;
        let event: GenerateLessonEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.retry_context(), None);
    }

    #[test]
    fn blank_previous_error_is_not_context() {
        let json = r#"{"lesson_id":"lsn-1","title":"t","objective":"o","previous_error":"  ","is_retry":true}"#;
        let event: GenerateLessonEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.retry_context(), None);
    }
}

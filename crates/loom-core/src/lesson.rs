use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::status::LessonStatus;

/// A lesson: one requested interactive artifact and the unit of generation work.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub objective: String,
    pub course_id: Option<String>,
    pub status: LessonStatus,
    /// Human-readable message of the most recent failure. Set only when `failed`.
    pub error: Option<String>,
    /// Public address of the compiled artifact. Set only when `completed`.
    pub compiled_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Verify the record-level invariants:
    /// the artifact address is present iff `completed`, the error iff `failed`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Invariant`] naming the violated rule.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let completed = self.status == LessonStatus::Completed;
        let failed = self.status == LessonStatus::Failed;

        if completed != self.compiled_url.is_some() {
            return Err(CoreError::Invariant {
                id: self.id.clone(),
                reason: format!(
                    "compiled_url must be set iff status is completed (status={}, compiled_url={:?})",
                    self.status, self.compiled_url
                ),
            });
        }
        if failed != self.error.is_some() {
            return Err(CoreError::Invariant {
                id: self.id.clone(),
                reason: format!(
                    "error must be set iff status is failed (status={}, error={:?})",
                    self.status, self.error
                ),
            });
        }
        Ok(())
    }

    /// Whether the compiled artifact address can be handed to a loader.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == LessonStatus::Completed && self.compiled_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(status: LessonStatus) -> Lesson {
        let now = Utc::now();
        Lesson {
            id: "lsn-00000001".into(),
            title: "Intro to Levers".into(),
            objective: "explain mechanical advantage".into(),
            course_id: None,
            status,
            error: None,
            compiled_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pending_without_fields_is_valid() {
        assert!(lesson(LessonStatus::Pending).check_invariants().is_ok());
        assert!(lesson(LessonStatus::Processing).check_invariants().is_ok());
    }

    #[test]
    fn completed_requires_address() {
        let mut l = lesson(LessonStatus::Completed);
        assert!(l.check_invariants().is_err());
        l.compiled_url = Some("http://localhost/artifacts/lsn-00000001.js".into());
        assert!(l.check_invariants().is_ok());
        assert!(l.is_ready());
    }

    #[test]
    fn failed_requires_error() {
        let mut l = lesson(LessonStatus::Failed);
        assert!(l.check_invariants().is_err());
        l.error = Some("Compile error: boom".into());
        assert!(l.check_invariants().is_ok());
        assert!(!l.is_ready());
    }

    #[test]
    fn address_on_non_completed_is_rejected() {
        let mut l = lesson(LessonStatus::Processing);
        l.compiled_url = Some("http://x".into());
        let err = l.check_invariants().unwrap_err();
        assert!(err.to_string().contains("compiled_url"));
    }
}

//! Cross-cutting error types for Loom.
//!
//! Domain-specific errors (`DatabaseError`, `StoreError`, `StageError`, ...)
//! live in their respective crates.

use thiserror::Error;

/// Errors raised by the core lesson types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A lesson record violates one of its invariants.
    #[error("Invariant violated for lesson {id}: {reason}")]
    Invariant { id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_message_names_lesson() {
        let err = CoreError::Invariant {
            id: "lsn-1".into(),
            reason: "completed without compiled code".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invariant violated for lesson lsn-1: completed without compiled code"
        );
    }
}

//! Stage error taxonomy for the compile path.

use thiserror::Error;

/// Failure of one compile-path stage. Every variant is recoverable within a
/// generation run: it is recorded and fed into the next attempt's prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Raw model output did not contain the entry construct.
    #[error("{0}")]
    Normalization(String),

    /// A cheap structural check failed before compilation.
    #[error("{0}")]
    Syntax(String),

    /// The transpiler rejected the source. Carries its message unmodified.
    #[error("Compile error: {0}")]
    Compile(String),
}

impl StageError {
    /// Stage name used in logs.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Normalization(_) => "normalize",
            Self::Syntax(_) => "validate",
            Self::Compile(_) => "transpile",
        }
    }
}

//! # loom-compiler
//!
//! The compile path for generated lesson source:
//!
//! 1. [`normalize`](normalize::normalize) isolates the entry construct from raw
//!    model output
//! 2. [`validate`](validate::validate) runs cheap structural checks
//! 3. [`transpile`](transpile::transpile) lowers TSX to an executable module
//!
//! [`compile`] runs all three. Every stage is a pure function; a failure at
//! any stage is a [`StageError`] that the orchestrator feeds into the next
//! attempt.

pub mod error;
pub mod normalize;
pub mod transpile;
pub mod validate;

pub use error::StageError;
pub use normalize::normalize;
pub use transpile::transpile;
pub use validate::validate;

/// Output of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Normalized TSX source.
    pub source: String,
    /// Executable JavaScript module body.
    pub code: String,
}

/// Run normalize, validate and transpile over raw model output.
///
/// # Errors
///
/// Returns the first [`StageError`] raised by any stage.
pub fn compile(raw: &str) -> Result<Compiled, StageError> {
    let source = normalize(raw)?;
    validate(&source)?;
    let code = transpile(&source)?;
    Ok(Compiled { source, code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_in_order() {
        let err = compile("no component here").unwrap_err();
        assert_eq!(err.stage(), "normalize");

        let err = compile("function LessonComponent() {\n  return (<div />;\n}").unwrap_err();
        assert_eq!(err.stage(), "validate");

        let err = compile("function LessonComponent() {\n  return <div></span>;\n}").unwrap_err();
        assert_eq!(err.stage(), "transpile");
    }
}

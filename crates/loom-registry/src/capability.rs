use serde::Serialize;
use std::fmt;

/// What a capability is for. Drives grouping in the prompt listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Layout,
    Typography,
    Feedback,
    Chart,
    Diagram,
    Formula,
    Calculator,
    Quiz,
    Code,
    Control,
}

impl CapabilityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Typography => "typography",
            Self::Feedback => "feedback",
            Self::Chart => "chart",
            Self::Diagram => "diagram",
            Self::Formula => "formula",
            Self::Calculator => "calculator",
            Self::Quiz => "quiz",
            Self::Code => "code",
            Self::Control => "control",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a capability comes from in the client runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySource {
    /// Lesson-specific primitives.
    Lesson,
    /// General-purpose form and disclosure controls.
    Control,
}

/// One named UI primitive a generated artifact may reference as a free variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub name: &'static str,
    pub kind: CapabilityKind,
    pub source: CapabilitySource,
    /// Usage line shown to the model, e.g. `<Progress value={75} />`.
    pub usage: &'static str,
    pub summary: &'static str,
}

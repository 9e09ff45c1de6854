//! # loom-registry
//!
//! The fixed, named set of UI primitives generated lessons may use without
//! importing them. The registry is immutable: it is a `const` table with
//! lookup and rendering helpers, and owns no state.

mod capability;
mod catalog;

pub use capability::{Capability, CapabilityKind, CapabilitySource};

/// Name under which the base UI runtime object is bound inside an artifact.
pub const RUNTIME_NAME: &str = "React";

/// All registered capabilities, in listing order.
#[must_use]
pub const fn capabilities() -> &'static [Capability] {
    catalog::CAPABILITIES
}

/// Names destructured from the base UI runtime (`useState`, `Fragment`, ...).
#[must_use]
pub const fn runtime_bindings() -> &'static [&'static str] {
    catalog::RUNTIME_BINDINGS
}

/// Iterate over capability names.
pub fn names() -> impl Iterator<Item = &'static str> {
    catalog::CAPABILITIES.iter().map(|c| c.name)
}

/// Look up a capability by its exact name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Capability> {
    catalog::CAPABILITIES.iter().find(|c| c.name == name)
}

/// Whether `name` is a registered capability.
#[must_use]
pub fn contains(name: &str) -> bool {
    lookup(name).is_some()
}

/// Whether `name` is bound in an artifact's scope by the loader: the runtime
/// object, a runtime binding, or a capability.
#[must_use]
pub fn is_injected(name: &str) -> bool {
    name == RUNTIME_NAME || catalog::RUNTIME_BINDINGS.contains(&name) || contains(name)
}

/// Render the registry as the usage list embedded in generation prompts.
#[must_use]
pub fn prompt_listing() -> String {
    let mut out = String::from("**Registry Components:**\n");
    for cap in catalog::CAPABILITIES
        .iter()
        .filter(|c| c.source == CapabilitySource::Lesson)
    {
        out.push_str(&format!("- `{}` - {}\n", cap.usage, cap.summary));
    }

    out.push_str("\n**Control Components:**\n");
    let controls: Vec<&str> = catalog::CAPABILITIES
        .iter()
        .filter(|c| c.source == CapabilitySource::Control)
        .map(|c| c.usage)
        .collect();
    for usage in controls {
        out.push_str(&format!("- `{usage}`\n"));
    }

    out.push_str("\n**Runtime:** `");
    out.push_str(RUNTIME_NAME);
    out.push_str("` plus ");
    out.push_str(&catalog::RUNTIME_BINDINGS.join(", "));
    out.push_str(". Do not import anything.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn is_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }

    #[test]
    fn names_are_unique_identifiers() {
        let mut seen = HashSet::new();
        for name in names().chain(runtime_bindings().iter().copied()) {
            assert!(is_identifier(name), "{name} is not an identifier");
            assert!(seen.insert(name), "{name} registered twice");
        }
        assert!(!seen.contains(RUNTIME_NAME));
    }

    #[test]
    fn capabilities_are_components() {
        for cap in capabilities() {
            assert!(
                cap.name.starts_with(|c: char| c.is_ascii_uppercase()),
                "{} must be capitalised to be used as a JSX tag",
                cap.name
            );
            assert!(cap.usage.contains(cap.name));
        }
    }

    #[test]
    fn does_not_shadow_javascript_globals() {
        for global in ["Math", "JSON", "Object", "Array", "Date", "Number", "String"] {
            assert!(!is_injected(global), "{global} would be shadowed");
        }
    }

    #[test]
    fn covers_every_kind_the_prompt_promises() {
        let kinds: HashSet<CapabilityKind> = capabilities().iter().map(|c| c.kind).collect();
        for kind in [
            CapabilityKind::Layout,
            CapabilityKind::Chart,
            CapabilityKind::Quiz,
            CapabilityKind::Formula,
            CapabilityKind::Calculator,
            CapabilityKind::Diagram,
        ] {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup("Quiz").map(|c| c.kind), Some(CapabilityKind::Quiz));
        assert!(lookup("quiz").is_none());
        assert!(!contains("Chart3D"));
        assert!(is_injected("useState"));
        assert!(is_injected("React"));
    }
}

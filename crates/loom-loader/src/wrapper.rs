//! Wrapper module synthesis.
//!
//! The wrapper binds the base UI runtime, its hooks, and every registered
//! capability at module scope, then splices the artifact body into a block so
//! declarations in the body may shadow any injected name. Exports lifted by
//! [`crate::rewrite`] are re-exported from module scope, and the conventional
//! entry name is always exported (as `undefined` when the body lacks it).

use loom_core::ENTRY_COMPONENT;
use loom_registry::{RUNTIME_NAME, names, runtime_bindings};

use crate::rewrite::{Export, Rewritten};

/// Global the host installs the base UI runtime under.
pub const RUNTIME_GLOBAL: &str = "__loom_runtime__";

/// Global the host installs the capability implementations under.
pub const CAPABILITIES_GLOBAL: &str = "__loom_capabilities__";

/// Build the executable wrapper module for a rewritten artifact.
#[must_use]
pub fn synthesize(rewritten: &Rewritten) -> String {
    let mut exports = rewritten.exports.clone();
    if !exports.iter().any(|e| e.name == ENTRY_COMPONENT) {
        exports.insert(0, Export::new(ENTRY_COMPONENT, ENTRY_COMPONENT));
    }

    let capabilities: Vec<&str> = names().collect();
    let mut out = String::with_capacity(rewritten.body.len() + 1024);
    out.push_str(&format!("const {RUNTIME_NAME} = globalThis.{RUNTIME_GLOBAL};\n"));
    out.push_str(&format!(
        "const {{ {} }} = {RUNTIME_NAME};\n",
        runtime_bindings().join(", ")
    ));
    out.push_str(&format!(
        "const {{ {} }} = globalThis.{CAPABILITIES_GLOBAL};\n",
        capabilities.join(", ")
    ));
    for slot in 0..exports.len() {
        out.push_str(&format!("let {};\n", slot_name(slot)));
    }

    out.push_str("{\n");
    out.push_str(&rewritten.body);
    if !rewritten.body.ends_with('\n') {
        out.push('\n');
    }
    for (slot, export) in exports.iter().enumerate() {
        out.push_str(&format!(
            "{} = typeof {local} !== \"undefined\" ? {local} : undefined;\n",
            slot_name(slot),
            local = export.local,
        ));
    }
    out.push_str("}\n");

    let clause: Vec<String> = exports
        .iter()
        .enumerate()
        .map(|(slot, e)| format!("{} as {}", slot_name(slot), e.name))
        .collect();
    out.push_str(&format!("export {{ {} }};\n", clause.join(", ")));
    out
}

fn slot_name(slot: usize) -> String {
    format!("__loom_export_{slot}__")
}

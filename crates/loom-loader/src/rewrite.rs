//! Source rewriting ahead of wrapper synthesis.
//!
//! Import lines for the base UI runtime become bindings against the runtime
//! global; any other import is rejected. Export statements are lifted out of
//! the body so it can be spliced into a block, and recorded so the wrapper can
//! re-export them from module scope.

use std::sync::LazyLock;

use loom_registry::RUNTIME_NAME;
use regex::{Captures, Regex};

use crate::error::LoadError;
use crate::wrapper::RUNTIME_GLOBAL;

/// Module specifier of the base UI runtime.
pub const RUNTIME_SPECIFIER: &str = "react";

/// Local binding used for an anonymous `export default <expr>`.
const DEFAULT_VALUE: &str = "__loom_default_value__";

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:(?P<clause>[^;'"]*?)\s*from\s*)?['"](?P<source>[^'"]+)['"][ \t]*;?"#)
        .expect("import pattern")
});

static EXPORT_DEFAULT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+default\s+(?P<kw>(?:async\s+)?function\b\s*\*?|class\b)\s*(?P<name>[A-Za-z_$][\w$]*)")
        .expect("default declaration pattern")
});

static EXPORT_DEFAULT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+default\s+(?P<name>[A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$")
        .expect("default name pattern")
});

static EXPORT_DEFAULT_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+default\s+").expect("default expression pattern")
});

static EXPORT_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s*\{(?P<list>[^}]*)\}[ \t]*;?[ \t]*$").expect("export list pattern")
});

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)export\s+(?P<kw>(?:async\s+)?function\b\s*\*?|class\b|const\b|let\b|var\b)\s*(?P<name>[A-Za-z_$][\w$]*)")
        .expect("export declaration pattern")
});

/// A name the module exports and the local binding behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub local: String,
}

impl Export {
    #[must_use]
    pub fn new(name: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: local.into(),
        }
    }
}

/// Artifact body with imports resolved and exports lifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub body: String,
    pub exports: Vec<Export>,
}

/// Rewrite runtime imports and lift exports out of `artifact`.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedImport`] for an import of anything other
/// than the base UI runtime.
pub fn rewrite(artifact: &str) -> Result<Rewritten, LoadError> {
    let body = rewrite_imports(artifact)?;
    let mut exports = Vec::new();

    let body = EXPORT_DEFAULT_DECL.replace_all(&body, |caps: &Captures<'_>| {
        exports.push(Export::new("default", &caps["name"]));
        format!("{}{} {}", &caps["indent"], caps["kw"].trim_end(), &caps["name"])
    });
    let body = EXPORT_DEFAULT_NAME.replace_all(&body, |caps: &Captures<'_>| {
        exports.push(Export::new("default", &caps["name"]));
        String::new()
    });
    let body = EXPORT_DEFAULT_EXPR.replace_all(&body, |caps: &Captures<'_>| {
        exports.push(Export::new("default", DEFAULT_VALUE));
        format!("{}const {DEFAULT_VALUE} = ", &caps["indent"])
    });
    let body = EXPORT_LIST.replace_all(&body, |caps: &Captures<'_>| {
        for item in caps["list"].split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.split_once(" as ") {
                Some((local, name)) => exports.push(Export::new(name.trim(), local.trim())),
                None => exports.push(Export::new(item, item)),
            }
        }
        String::new()
    });
    let body = EXPORT_DECL.replace_all(&body, |caps: &Captures<'_>| {
        exports.push(Export::new(&caps["name"], &caps["name"]));
        format!("{}{} {}", &caps["indent"], caps["kw"].trim_end(), &caps["name"])
    });

    let mut seen = Vec::new();
    exports.retain(|e| {
        if seen.contains(&e.name) {
            false
        } else {
            seen.push(e.name.clone());
            true
        }
    });

    Ok(Rewritten {
        body: body.into_owned(),
        exports,
    })
}

fn rewrite_imports(artifact: &str) -> Result<String, LoadError> {
    let mut out = String::with_capacity(artifact.len());
    let mut cursor = 0;

    for caps in IMPORT.captures_iter(artifact) {
        let Some(whole) = caps.get(0) else { continue };
        let specifier = &caps["source"];
        if specifier != RUNTIME_SPECIFIER {
            return Err(LoadError::UnsupportedImport {
                specifier: specifier.to_string(),
            });
        }
        out.push_str(&artifact[cursor..whole.start()]);
        if let Some(clause) = caps.name("clause") {
            out.push_str(&bind_clause(clause.as_str()));
        }
        cursor = whole.end();
    }
    out.push_str(&artifact[cursor..]);
    Ok(out)
}

/// `React, { useState as useS }` becomes bindings read from the runtime global.
fn bind_clause(clause: &str) -> String {
    let clause = clause.trim();
    if clause.starts_with("type ") {
        return String::new();
    }

    let (head, named) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (&clause[..open], Some(&clause[open + 1..close])),
        _ => (clause, None),
    };

    let mut bindings = Vec::new();
    let head = head.trim().trim_end_matches(',').trim();
    if !head.is_empty() {
        let local = head
            .strip_prefix('*')
            .map_or(head, |rest| rest.trim().trim_start_matches("as").trim());
        if local != RUNTIME_NAME {
            bindings.push(format!("const {local} = globalThis.{RUNTIME_GLOBAL};"));
        }
    }

    if let Some(named) = named {
        let specs: Vec<String> = named
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("type "))
            .map(|s| match s.split_once(" as ") {
                Some((imported, local)) => format!("{}: {}", imported.trim(), local.trim()),
                None => s.to_string(),
            })
            .collect();
        if !specs.is_empty() {
            bindings.push(format!(
                "const {{ {} }} = globalThis.{RUNTIME_GLOBAL};",
                specs.join(", ")
            ));
        }
    }
    bindings.join(" ")
}

//! Source normalizer: isolate the entry construct from raw model output.
//!
//! Steps, in order:
//! 1. drop `<thinking>` / `<reasoning>` sections
//! 2. discard everything before the first `function LessonComponent`
//! 3. if that declaration sat inside a code fence, cut at the closing fence
//! 4. drop remaining fence delimiter lines (any fence language)
//! 5. drop import lines and exports of the entry construct

use std::sync::LazyLock;

use loom_core::{ENTRY_COMPONENT, ENTRY_DECLARATION};
use regex::Regex;

use crate::error::StageError;

static REASONING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<thinking>.*?</thinking>|<reasoning>.*?</reasoning>")
        .expect("reasoning pattern is valid")
});

static FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(```|~~~)[\w+#.-]*\s*$").expect("fence pattern is valid")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:[^;'"]*?\s+from\s+)?['"][^'"\n]+['"][ \t]*;?[ \t]*\r?\n?"#)
        .expect("import pattern is valid")
});

static ENTRY_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*export\s+(?:default\s+{ENTRY_COMPONENT}|\{{\s*{ENTRY_COMPONENT}(?:\s+as\s+default)?\s*\}})[ \t]*;?[ \t]*\r?\n?"
    ))
    .expect("export pattern is valid")
});

/// Message recorded when the entry construct is absent.
#[must_use]
pub fn missing_entry_message() -> String {
    format!("model did not generate {ENTRY_COMPONENT}")
}

/// Normalize raw model output into the source of the entry construct.
///
/// # Errors
///
/// Returns [`StageError::Normalization`] when no `function LessonComponent`
/// declaration survives trimming.
pub fn normalize(raw: &str) -> Result<String, StageError> {
    let without_reasoning = REASONING.replace_all(raw, "");
    let text = without_reasoning.as_ref();

    let start = find_entry(text).ok_or_else(|| StageError::Normalization(missing_entry_message()))?;
    let (preamble, body) = text.split_at(start);

    let body = if inside_open_fence(preamble) {
        cut_at_closing_fence(body)
    } else {
        body
    };

    let unfenced: String = body
        .lines()
        .filter(|line| !FENCE_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n");

    let without_imports = IMPORT.replace_all(&unfenced, "");
    let without_exports = ENTRY_EXPORT.replace_all(&without_imports, "");
    let normalized = without_exports.trim().to_string();

    if find_entry(&normalized).is_none() {
        return Err(StageError::Normalization(missing_entry_message()));
    }
    tracing::debug!(bytes = normalized.len(), "normalized model output");
    Ok(normalized)
}

/// Byte offset of the first `function LessonComponent` that is not a prefix of
/// a longer identifier.
fn find_entry(text: &str) -> Option<usize> {
    text.match_indices(ENTRY_DECLARATION).find_map(|(idx, m)| {
        let after = text[idx + m.len()..].chars().next();
        let before = text[..idx].chars().next_back();
        let ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
        (!after.is_some_and(ident) && !before.is_some_and(ident)).then_some(idx)
    })
}

fn inside_open_fence(preamble: &str) -> bool {
    preamble.lines().filter(|l| FENCE_LINE.is_match(l)).count() % 2 == 1
}

fn cut_at_closing_fence(body: &str) -> &str {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if FENCE_LINE.is_match(line.trim_end_matches(['\r', '\n'])) {
            return &body[..offset];
        }
        offset += line.len();
    }
    body
}

//! Parse-error reporting with `line:column` positions.

use super::TsxNode;
use crate::error::StageError;

/// Longest excerpt of offending source quoted in a message.
const SNIPPET_CHARS: usize = 30;

/// 1-based line and column (in characters) of a byte offset.
pub(crate) fn line_col(source: &str, byte: usize) -> (usize, usize) {
    let before = &source[..byte.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Build a compile error positioned at `node`.
pub(crate) fn error_at(source: &str, node: &TsxNode<'_>, message: &str) -> StageError {
    let (line, column) = line_col(source, node.range().start);
    StageError::Compile(format!("{line}:{column}: {message}"))
}

/// First parse error in document order: an `ERROR` node, or a zero-width
/// leaf the parser inserted to recover (a missing token).
pub(crate) fn first_syntax_error(root: &TsxNode<'_>, source: &str) -> Option<StageError> {
    let mut stack = vec![root.clone()];
    let mut is_root = true;

    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if kind.as_ref() == "ERROR" {
            return Some(error_at(source, &node, &unexpected(&node.text())));
        }

        let children: Vec<_> = node.children().collect();
        let range = node.range();
        if children.is_empty() && range.is_empty() && !is_root {
            return Some(error_at(source, &node, &format!("Expected \"{}\"", kind.as_ref())));
        }
        is_root = false;
        stack.extend(children.into_iter().rev());
    }
    None
}

fn unexpected(text: &str) -> String {
    let first_line = text.trim_start().lines().next().unwrap_or("").trim_end();
    if first_line.is_empty() {
        return String::from("Unexpected end of file");
    }
    let mut snippet: String = first_line.chars().take(SNIPPET_CHARS).collect();
    if first_line.chars().count() > SNIPPET_CHARS {
        snippet.push_str("...");
    }
    format!("Unexpected \"{snippet}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let src = "ab\ncd\nπx";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (2, 2));
        // `x` follows a two-byte character.
        assert_eq!(line_col(src, src.find('x').unwrap()), (3, 2));
    }

    #[test]
    fn long_snippets_are_truncated() {
        let msg = unexpected("const value = someVeryLongFunctionName(argumentOne)");
        assert!(msg.ends_with("...\""), "{msg}");
        assert_eq!(unexpected("  \n"), "Unexpected end of file");
    }
}

//! Static validator: cheap structural checks ahead of transpilation.
//!
//! Delimiters are counted outside comments, string literals, and template
//! literal text. A quote directly after a letter or digit is read as an
//! apostrophe in prose (`Let's`), not as a string opener.

use loom_core::{ENTRY_COMPONENT, ENTRY_DECLARATION};

use crate::error::StageError;

/// Opening and closing counts for one delimiter kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelimiterCount {
    pub opening: usize,
    pub closing: usize,
}

impl DelimiterCount {
    #[must_use]
    pub const fn is_balanced(self) -> bool {
        self.opening == self.closing
    }
}

/// Delimiter counts for a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelimiterReport {
    pub braces: DelimiterCount,
    pub parentheses: DelimiterCount,
}

/// Check delimiter balance and the presence of the entry declaration.
///
/// # Errors
///
/// Returns [`StageError::Syntax`] naming the unbalanced delimiter kind and its
/// counts, or the missing entry declaration.
pub fn validate(source: &str) -> Result<(), StageError> {
    let report = count_delimiters(source);
    for (kind, count) in [("braces", report.braces), ("parentheses", report.parentheses)] {
        if !count.is_balanced() {
            return Err(StageError::Syntax(format!(
                "mismatched {kind}: {} opening vs {} closing",
                count.opening, count.closing
            )));
        }
    }

    if !source.contains(ENTRY_DECLARATION) {
        return Err(StageError::Syntax(format!(
            "missing entry construct: expected `{ENTRY_DECLARATION}` declaring {ENTRY_COMPONENT}"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Mode {
    Code,
    Template,
}

/// Count braces and parentheses in code positions.
#[must_use]
pub fn count_delimiters(source: &str) -> DelimiterReport {
    let mut report = DelimiterReport::default();
    // Each entry is a lexical context; `Code` entries opened by `${` carry
    // their own brace depth so the closing `}` returns to the template.
    let mut stack: Vec<(Mode, usize)> = vec![(Mode::Code, 0)];
    let chars: Vec<char> = source.chars().collect();
    let mut prev_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let top = stack.len() - 1;

        match stack[top].0 {
            Mode::Template => match c {
                '\\' => i += 1,
                '`' => {
                    stack.pop();
                }
                '$' if next == Some('{') => {
                    stack.push((Mode::Code, 0));
                    i += 1;
                }
                _ => {}
            },
            Mode::Code => match c {
                '/' if next == Some('/') => {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
                '/' if next == Some('*') => {
                    i += 2;
                    while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                        i += 1;
                    }
                    i += 2;
                    continue;
                }
                '"' | '\'' if !prev_significant.is_some_and(char::is_alphanumeric) => {
                    i = skip_string(&chars, i, c);
                    prev_significant = Some(c);
                    continue;
                }
                '`' => stack.push((Mode::Template, 0)),
                '{' => {
                    report.braces.opening += 1;
                    stack[top].1 += 1;
                }
                '}' => {
                    if stack[top].1 == 0 && top > 0 {
                        // Closes a `${`, not a counted brace.
                        stack.pop();
                    } else {
                        report.braces.closing += 1;
                        stack[top].1 = stack[top].1.saturating_sub(1);
                    }
                }
                '(' => report.parentheses.opening += 1,
                ')' => report.parentheses.closing += 1,
                _ => {}
            },
        }

        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        i += 1;
    }
    report
}

/// Skip a quoted string starting at `start`; ends at the matching quote or the
/// end of the line. Returns the index after the string.
fn skip_string(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

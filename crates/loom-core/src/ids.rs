//! ID prefixes and run-token formatting.
//!
//! Lesson IDs look like `lsn-a3f8b2c1`. Run tokens are 16 lowercase hex
//! characters. Both random parts are produced by the database (`randomblob`).

/// Prefix for lesson identifiers.
pub const PREFIX_LESSON: &str = "lsn";

/// Length of a run token in hex characters.
pub const RUN_TOKEN_LEN: usize = 16;

/// Check whether `token` has the run-token shape.
#[must_use]
pub fn is_run_token(token: &str) -> bool {
    token.len() == RUN_TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Check whether `id` carries the lesson prefix.
#[must_use]
pub fn is_lesson_id(id: &str) -> bool {
    id.strip_prefix(PREFIX_LESSON)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

//! # loom-core
//!
//! Core types shared across all Loom crates:
//! - The [`Lesson`](lesson::Lesson) entity and its invariants
//! - [`LessonStatus`](status::LessonStatus) with its state machine transitions
//! - The [`GenerateLessonEvent`](event::GenerateLessonEvent) trigger envelope
//! - Entry-construct naming conventions shared by the compiler and the loader
//! - Cross-cutting error types

pub mod entry;
pub mod errors;
pub mod event;
pub mod ids;
pub mod lesson;
pub mod status;

pub use entry::{ENTRY_COMPONENT, ENTRY_DECLARATION, ENTRY_KEYWORD};
pub use errors::CoreError;
pub use event::GenerateLessonEvent;
pub use lesson::Lesson;
pub use status::LessonStatus;

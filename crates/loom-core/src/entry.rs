//! Naming conventions for the entry construct every generated artifact must declare.
//!
//! The compiler uses these to locate and check the declaration; the loader uses
//! [`ENTRY_COMPONENT`] as the conventional export name.

/// Name of the single top-level component a generated artifact must define.
pub const ENTRY_COMPONENT: &str = "LessonComponent";

/// Declaration keyword that introduces the entry construct.
pub const ENTRY_KEYWORD: &str = "function";

/// The verbatim declaration prefix (`function LessonComponent`).
pub const ENTRY_DECLARATION: &str = "function LessonComponent";

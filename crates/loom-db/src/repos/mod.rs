//! Repository methods, implemented as `impl LessonDb` blocks.

pub mod lesson;

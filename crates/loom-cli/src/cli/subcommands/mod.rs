mod lesson;

pub use lesson::LessonCommands;

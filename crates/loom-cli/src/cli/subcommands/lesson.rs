use clap::Subcommand;

/// Lesson record commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LessonCommands {
    /// Create a pending lesson.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        objective: String,
        #[arg(long)]
        course: Option<String>,
    },
    /// Get a lesson by ID.
    Get { id: String },
    /// List lessons, newest first (bounded by `--limit`).
    List {
        #[arg(long)]
        status: Option<String>,
    },
}

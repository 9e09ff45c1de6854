use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::LessonCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Lesson records.
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
    /// Run one generation for a stored lesson.
    Generate(GenerateArgs),
    /// Reset a failed lesson and run generation again with its last error.
    Retry(RetryArgs),
    /// Normalize, validate and transpile a local file.
    Compile(CompileArgs),
    /// Serve artifacts and the manual retry endpoint.
    Serve(ServeArgs),
    /// Load a completed lesson's artifact and render it headlessly.
    Preview(PreviewArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GenerateArgs {
    /// Lesson ID.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct RetryArgs {
    /// Lesson ID.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct CompileArgs {
    /// File holding raw model output or TSX source.
    pub file: PathBuf,

    /// Write the compiled module here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct PreviewArgs {
    /// Lesson ID.
    pub id: String,
}

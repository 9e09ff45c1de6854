mod create;
mod get;
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LessonCommands;
use crate::context::AppContext;

/// Handle `loom lesson`.
pub async fn handle(action: &LessonCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LessonCommands::Create {
            title,
            objective,
            course,
        } => create::run(title, objective, course.as_deref(), ctx, flags).await,
        LessonCommands::Get { id } => get::run(id, ctx, flags).await,
        LessonCommands::List { status } => list::run(status.as_deref(), ctx, flags).await,
    }
}

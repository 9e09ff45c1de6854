use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Lesson { action } => commands::lesson::handle(&action, ctx, flags).await,
        Commands::Generate(args) => commands::generate::handle(&args, ctx, flags).await,
        Commands::Retry(args) => commands::retry::handle(&args, ctx, flags).await,
        Commands::Serve(args) => commands::serve::handle(&args, ctx, flags).await,
        Commands::Preview(args) => commands::preview::handle(&args, ctx, flags).await,
        Commands::Compile(args) => commands::compile::handle(&args, flags),
    }
}

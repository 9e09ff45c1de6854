use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let lesson = ctx.db.get_lesson(id).await?;
    output(&lesson, flags.format)
}

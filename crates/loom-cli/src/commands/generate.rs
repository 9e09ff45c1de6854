use loom_core::GenerateLessonEvent;

use crate::cli::{GenerateArgs, GlobalFlags};
use crate::commands::shared::report::RunReport;
use crate::context::AppContext;
use crate::output::output;

/// Handle `loom generate`.
pub async fn handle(args: &GenerateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let lesson = ctx.db.get_lesson(&args.id).await?;
    let orchestrator = ctx.orchestrator()?;

    let event = GenerateLessonEvent::for_lesson(&lesson);
    let outcome = orchestrator.run(&event).await?;
    output(&RunReport::new(&lesson.id, outcome), flags.format)
}

use anyhow::Context;
use loom_pipeline::{JobRunner, request_retry};

use crate::cli::{GlobalFlags, RetryArgs};
use crate::commands::shared::report::RunReport;
use crate::context::AppContext;
use crate::output::output;

/// Handle `loom retry`: reset a failed lesson, then run the emitted event.
pub async fn handle(args: &RetryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let orchestrator = ctx.orchestrator()?;
    let (queue, runner) = JobRunner::new(orchestrator, 1);
    let worker = tokio::spawn(runner.run());

    let requested = request_retry(&ctx.db, &queue, &args.id).await;
    drop(queue);
    let outcomes = worker.await.context("job runner panicked")?;
    requested?;

    let (lesson_id, outcome) = outcomes
        .into_iter()
        .next()
        .context("retry run ended without a recorded outcome")?;
    output(&RunReport::new(&lesson_id, outcome), flags.format)
}

use anyhow::Context;
use loom_core::LessonStatus;
use loom_loader::{BoaHost, DynamicLoader, ModuleHost};
use serde::Serialize;

use crate::cli::{GlobalFlags, PreviewArgs};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct Preview {
    lesson_id: String,
    compiled_url: String,
    export: &'static str,
    tree: serde_json::Value,
}

/// Handle `loom preview`: fetch a completed lesson's artifact, import it in
/// the headless host and render its element tree.
pub async fn handle(args: &PreviewArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let lesson = ctx.db.get_lesson(&args.id).await?;
    if lesson.status != LessonStatus::Completed {
        anyhow::bail!("lesson {} is {}, not completed", lesson.id, lesson.status);
    }
    let compiled_url = lesson
        .compiled_url
        .context("completed lesson has no compiled_url")?;

    let loader = DynamicLoader::new(&ctx.config.loader)?;
    let mut host = BoaHost::new()?;
    let loaded = loader.load(&mut host, &compiled_url).await?;
    let tree = host.render(&loaded.component)?;

    output(
        &Preview {
            lesson_id: lesson.id,
            compiled_url,
            export: loaded.export,
            tree,
        },
        flags.format,
    )
}

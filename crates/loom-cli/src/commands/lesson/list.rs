use loom_core::LessonStatus;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(status: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, 20);
    let status = status
        .map(|s| parse_enum::<LessonStatus>(s, "status"))
        .transpose()?;

    let lessons = ctx.db.list_lessons(status, limit).await?;
    output(&lessons, flags.format)
}

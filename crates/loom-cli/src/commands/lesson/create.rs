use loom_db::NewLesson;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    title: &str,
    objective: &str,
    course: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("lesson title must not be empty");
    }
    let lesson = ctx
        .db
        .create_lesson(&NewLesson {
            title: title.to_string(),
            objective: objective.to_string(),
            course_id: course.map(ToString::to_string),
        })
        .await?;
    output(&lesson, flags.format)
}

use anyhow::Context;
use serde::Serialize;

use crate::cli::{CompileArgs, GlobalFlags, OutputFormat};
use crate::output::output;

#[derive(Serialize)]
struct CompileReport<'a> {
    file: String,
    source: &'a str,
    code: &'a str,
}

/// Handle `loom compile`: run the compile path over a local file.
pub fn handle(args: &CompileArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let compiled = loom_compiler::compile(&raw)
        .map_err(|e| anyhow::anyhow!("{} stage failed: {e}", e.stage()))?;

    if let Some(out) = &args.out {
        std::fs::write(out, &compiled.code)
            .with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), bytes = compiled.code.len(), "compiled module written");
        return Ok(());
    }

    match flags.format {
        OutputFormat::Raw => {
            println!("{}", compiled.code);
            Ok(())
        }
        OutputFormat::Json => output(
            &CompileReport {
                file: args.file.display().to_string(),
                source: &compiled.source,
                code: &compiled.code,
            },
            flags.format,
        ),
    }
}

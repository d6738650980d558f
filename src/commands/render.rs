//! Implementation of the `doubtreel render` command.

use super::{bind_generator, load_config, read_answer};
use crate::cli::RenderArgs;
use crate::error::Result;
use crate::pipeline::{RenderOutcome, ScenePipeline, ScriptRequest};
use std::path::Path;
use tracing::info;

pub(super) async fn cmd_render(config_path: Option<&Path>, args: RenderArgs) -> Result<()> {
    let outcome = render(config_path, &args).await?;
    println!("{}", outcome.artifact.display());
    Ok(())
}

async fn render(config_path: Option<&Path>, args: &RenderArgs) -> Result<RenderOutcome> {
    let config = load_config(config_path, args.provider.as_deref())?;
    let request = ScriptRequest {
        question: args.input.question.clone(),
        answer: read_answer(&args.input)?,
        output_dir: args.output_dir.clone(),
    };

    let generator = bind_generator(&config, !args.fallback_only)?;
    let pipeline = ScenePipeline::from_config(&config, generator)?;

    let outcome = if args.fallback_only {
        pipeline.render_fallback(&request).await?
    } else {
        pipeline.render(&request).await?
    };

    info!(
        job_id = %outcome.job_id,
        origin = %outcome.origin,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "video ready"
    );
    Ok(outcome)
}

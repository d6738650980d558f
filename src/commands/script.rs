//! Implementation of the `doubtreel script` command.
//!
//! Prints the script the `render` command would hand to the renderer. With
//! `--fallback` the provider is never called; with `--no-fallback` any
//! generation or validation error is reported instead of being absorbed.

use super::{bind_generator, load_config, read_answer};
use crate::cli::ScriptArgs;
use crate::error::Result;
use crate::fallback::fallback_script;
use crate::patch::CandidateScript;
use crate::pipeline::ScenePipeline;
use std::path::Path;

pub(super) async fn cmd_script(config_path: Option<&Path>, args: ScriptArgs) -> Result<()> {
    let script = script(config_path, &args).await?;
    eprintln!("origin: {}", script.origin);
    if !script.applied.is_empty() {
        eprintln!("patched: {}", script.applied.join(", "));
    }
    print!("{}", script.source);
    Ok(())
}

async fn script(config_path: Option<&Path>, args: &ScriptArgs) -> Result<CandidateScript> {
    let config = load_config(config_path, args.provider.as_deref())?;
    let question = &args.input.question;
    let answer = read_answer(&args.input)?;

    if args.fallback {
        return Ok(fallback_script(question, &answer, &config.fallback));
    }

    let pipeline = ScenePipeline::from_config(&config, bind_generator(&config, true)?)?;
    if args.no_fallback {
        pipeline.generate_script(question, &answer).await
    } else {
        Ok(pipeline.prepare_script(question, &answer).await.script)
    }
}

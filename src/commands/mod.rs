//! Command implementations for doubtreel.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the config and input handling they share.

mod patch;
mod render;
mod script;

use crate::cli::{Cli, Command, SceneInput};
use crate::config::{Config, Provider};
use crate::error::{DoubtreelError, Result};
use crate::generate::{DisabledGenerator, ScriptGenerator, build_generator};
use std::path::Path;
use std::sync::Arc;

pub use patch::patch_file;

/// Dispatch a command to its implementation.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Render(args) => render::cmd_render(config_path, args).await,
        Command::Script(args) => script::cmd_script(config_path, args).await,
        Command::Patch(args) => patch::cmd_patch(args),
    }
}

/// Resolve the config, applying a `--provider` override.
pub(crate) fn load_config(explicit: Option<&Path>, provider: Option<&str>) -> Result<Config> {
    let mut config = Config::resolve(explicit)?;
    if let Some(name) = provider {
        config.generation.provider = Provider::from_str(name).ok_or_else(|| {
            DoubtreelError::Config(format!(
                "unknown provider '{}'\nFix: use one of: groq, gemini.",
                name
            ))
        })?;
    }
    Ok(config)
}

/// The answer text, read from `--answer` or `--answer-file`.
pub(crate) fn read_answer(input: &SceneInput) -> Result<String> {
    match (&input.answer, &input.answer_file) {
        (Some(answer), _) => Ok(answer.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            DoubtreelError::Config(format!(
                "failed to read answer file '{}': {}",
                path.display(),
                e
            ))
        }),
        (None, None) => Err(DoubtreelError::Config(
            "no answer given\nFix: pass --answer <TEXT> or --answer-file <FILE>.".to_string(),
        )),
    }
}

/// Bind the configured provider, or the disabled generator when generation
/// is switched off for this run.
pub(crate) fn bind_generator(
    config: &Config,
    generation_enabled: bool,
) -> Result<Arc<dyn ScriptGenerator>> {
    if generation_enabled {
        build_generator(config)
    } else {
        Ok(Arc::new(DisabledGenerator))
    }
}

//! CLI argument parsing for doubtreel.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Doubtreel: turn a question and its answer into an explanatory animation.
///
/// A text-generation provider writes a scene script, which is extracted,
/// patched, and rendered by an external renderer. When generation fails a
/// built-in template script is rendered instead.
#[derive(Parser, Debug)]
#[command(name = "doubtreel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./doubtreel.yaml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for doubtreel.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a video for a question and answer.
    ///
    /// Prints the path of the rendered video on success.
    Render(RenderArgs),

    /// Print the script that would be rendered, without rendering it.
    Script(ScriptArgs),

    /// Extract and patch a saved generator response.
    ///
    /// Prints the patched script; the applied rules are reported on stderr.
    Patch(PatchArgs),
}

/// The question and answer a scene explains.
#[derive(Args, Debug)]
pub struct SceneInput {
    /// The student's question.
    #[arg(short, long)]
    pub question: String,

    /// The answer to explain.
    #[arg(short, long, required_unless_present = "answer_file", conflicts_with = "answer_file")]
    pub answer: Option<String>,

    /// Read the answer from a file instead.
    #[arg(long, value_name = "FILE")]
    pub answer_file: Option<PathBuf>,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: SceneInput,

    /// Directory that receives the video.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Generation provider, overriding the config.
    #[arg(long, value_parser = ["groq", "gemini"])]
    pub provider: Option<String>,

    /// Skip generation and render the template script.
    #[arg(long)]
    pub fallback_only: bool,
}

/// Arguments for the `script` command.
#[derive(Parser, Debug)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub input: SceneInput,

    /// Generation provider, overriding the config.
    #[arg(long, value_parser = ["groq", "gemini"])]
    pub provider: Option<String>,

    /// Print the template script without calling the provider.
    #[arg(long, conflicts_with = "no_fallback")]
    pub fallback: bool,

    /// Report generation and validation errors instead of falling back.
    #[arg(long)]
    pub no_fallback: bool,
}

/// Arguments for the `patch` command.
#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// File holding a raw generator response.
    pub file: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

//! Doubtreel: turn a student's question and its answer into an explanatory
//! Manim animation.
//!
//! This is the main entry point for the `doubtreel` CLI. It loads `.env`,
//! installs the log subscriber, parses arguments, dispatches to the command
//! handler, and maps errors to exit codes.

use doubtreel::cli::Cli;
use doubtreel::{commands, exit_codes};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "doubtreel=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    match commands::dispatch(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

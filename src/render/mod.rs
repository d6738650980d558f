//! Rendering a script into a video with the external renderer.
//!
//! A job moves through [`JobState`] once:
//!
//! ```text
//! Created -> ScriptWritten -> Rendering -> Succeeded
//!    |            |              |
//!    +------------+--------------+-------> Failed
//! ```
//!
//! The script lives in an [`EphemeralScript`] for exactly the duration of the
//! job; it is removed on every exit path, including cancellation.

mod ephemeral;
mod executor;

#[cfg(test)]
mod tests;

pub use ephemeral::EphemeralScript;
pub use executor::RenderExecutor;

use crate::scene::{artifact_file_name, script_file_name};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Number of trailing stderr lines shown in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Errors raised by the renderer stage.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to start renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer {}:\n{}", exit_label(.code), stderr_tail(.stderr))]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("renderer exited successfully but no video was written to '{}'", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("renderer timed out after {seconds}s and was killed")]
    Timeout { seconds: u64 },

    #[error("failed to wait for renderer: {0}")]
    Wait(#[source] std::io::Error),

    #[error("render job {job_id} already ran (state {state:?}); jobs are not resumable")]
    JobAlreadyStarted { job_id: String, state: JobState },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n")
}

/// Lifecycle of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    ScriptWritten,
    Rendering,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether `next` is a legal successor. No state is re-entered.
    pub fn can_advance_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, ScriptWritten)
                | (ScriptWritten, Rendering)
                | (Rendering, Succeeded)
                | (Created | ScriptWritten | Rendering, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// One render invocation: its id and the two paths derived from it.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// 32 lowercase hex characters (UUIDv4).
    pub job_id: String,
    /// Ephemeral script location inside the scratch directory.
    pub script_path: PathBuf,
    /// Where the renderer is told to write the video.
    pub output_path: PathBuf,
    state: JobState,
}

impl RenderJob {
    /// Create a job with a fresh random id.
    pub fn new(scratch_dir: &Path, output_dir: &Path) -> Self {
        let job_id = Uuid::new_v4().simple().to_string();
        Self {
            script_path: scratch_dir.join(script_file_name(&job_id)),
            output_path: output_dir.join(artifact_file_name(&job_id)),
            job_id,
            state: JobState::Created,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`; illegal transitions are ignored and logged.
    pub(crate) fn advance(&mut self, next: JobState) {
        if self.state.can_advance_to(next) {
            tracing::debug!(job_id = %self.job_id, from = ?self.state, to = ?next, "render job state");
            self.state = next;
        } else {
            tracing::warn!(job_id = %self.job_id, from = ?self.state, to = ?next, "ignoring illegal job state transition");
        }
    }
}

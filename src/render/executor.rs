//! Renderer subprocess execution.

use super::{EphemeralScript, JobState, RenderError, RenderJob};
use crate::config::{Config, Quality};
use crate::error::{DoubtreelError, Result};
use crate::patch::{CandidateScript, ValidationError};
use crate::scene::{ENTRY_SYMBOL, OUTPUT_FILE_FLAG};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Maximum stdout or stderr captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;

/// Runs the external renderer for one script at a time.
///
/// Holds no mutable state; one executor can serve concurrent jobs.
#[derive(Debug, Clone)]
pub struct RenderExecutor {
    program: String,
    args: Vec<String>,
    quality: Quality,
    timeout: Duration,
    scratch_dir: PathBuf,
}

impl RenderExecutor {
    /// Build an executor from `renderer.*` settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut argv = config.renderer_argv()?;
        let program = argv.remove(0);
        Ok(Self {
            program,
            args: argv,
            quality: config.renderer.quality,
            timeout: Duration::from_secs(config.renderer.timeout_seconds),
            scratch_dir: config.scratch_dir(),
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Create the output and scratch directories and allocate a job.
    ///
    /// Both directories are made absolute, since the renderer runs with the
    /// scratch directory as its working directory.
    pub fn prepare(&self, output_dir: &Path) -> Result<RenderJob> {
        let output_dir = ensure_dir(output_dir)?;
        let scratch_dir = ensure_dir(&self.scratch_dir)?;
        Ok(RenderJob::new(&scratch_dir, &output_dir))
    }

    /// Render `script` for `job`, returning the video path.
    ///
    /// The ephemeral script is removed before this returns, whatever the
    /// outcome. Success is reported only if the video file exists.
    ///
    /// A job runs once: executing a job that has left [`JobState::Created`]
    /// fails with [`RenderError::JobAlreadyStarted`] and leaves it untouched.
    pub async fn execute(&self, job: &mut RenderJob, script: &CandidateScript) -> Result<PathBuf> {
        if job.state() != JobState::Created {
            return Err(RenderError::JobAlreadyStarted {
                job_id: job.job_id.clone(),
                state: job.state(),
            }
            .into());
        }

        let started = Instant::now();
        let result = self.run_job(job, script).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(path) => {
                job.advance(JobState::Succeeded);
                info!(job_id = %job.job_id, origin = %script.origin, elapsed_ms, artifact = %path.display(), "render succeeded");
            }
            Err(e) => {
                job.advance(JobState::Failed);
                warn!(job_id = %job.job_id, origin = %script.origin, elapsed_ms, error = %e, "render failed");
            }
        }
        result
    }

    /// Prepare a job in `output_dir` and execute it.
    pub async fn render(&self, script: &CandidateScript, output_dir: &Path) -> Result<PathBuf> {
        let mut job = self.prepare(output_dir)?;
        self.execute(&mut job, script).await
    }

    async fn run_job(&self, job: &mut RenderJob, script: &CandidateScript) -> Result<PathBuf> {
        if !script.has_entry_symbol {
            return Err(ValidationError::MissingEntrySymbol {
                symbol: ENTRY_SYMBOL.to_string(),
            }
            .into());
        }

        let path = job.script_path.clone();
        let source = script.source.clone();
        let ephemeral = tokio::task::spawn_blocking(move || EphemeralScript::write(path, &source))
            .await
            .map_err(|e| DoubtreelError::filesystem(&job.script_path, io::Error::other(e)))??;
        job.advance(JobState::ScriptWritten);

        job.advance(JobState::Rendering);
        let outcome = self.run_renderer(job).await;

        let released = tokio::task::spawn_blocking(move || ephemeral.release())
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e)));
        let stderr = match outcome {
            Ok(stderr) => stderr,
            Err(e) => {
                if let Err(cleanup) = released {
                    warn!(job_id = %job.job_id, path = %job.script_path.display(), error = %cleanup, "failed to remove render script");
                }
                return Err(e.into());
            }
        };
        released.map_err(|e| DoubtreelError::filesystem(&job.script_path, e))?;

        if !stderr.trim().is_empty() {
            debug!(job_id = %job.job_id, stderr = %stderr.trim_end(), "renderer diagnostics");
        }

        if job.output_path.is_file() {
            Ok(job.output_path.clone())
        } else {
            Err(RenderError::MissingArtifact {
                path: job.output_path.clone(),
            }
            .into())
        }
    }

    /// Spawn the renderer and wait for it under the deadline.
    ///
    /// Returns the captured stderr when the renderer exits with status 0.
    async fn run_renderer(&self, job: &RenderJob) -> std::result::Result<String, RenderError> {
        let mut output_flag = OsString::from(OUTPUT_FILE_FLAG);
        output_flag.push(&job.output_path);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&job.script_path)
            .arg(ENTRY_SYMBOL)
            .arg(self.quality.flag())
            .arg(output_flag)
            .current_dir(&self.scratch_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!(job_id = %job.job_id, program = %self.program, script = %job.script_path.display(), "starting renderer");

        let mut child = cmd.spawn().map_err(|source| RenderError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Drain both pipes concurrently so a chatty renderer cannot block on
        // a full pipe while we wait for it.
        let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let stderr_task = tokio::spawn(read_stream(child.stderr.take()));
        let deadline = tokio::time::Instant::now() + self.timeout;

        match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => {
                // A grandchild (ffmpeg) may still hold the pipes open.
                let stdout = join_reader(stdout_task, deadline).await;
                let stderr = join_reader(stderr_task, deadline).await;
                let stderr = String::from_utf8_lossy(&stderr).into_owned();
                debug!(job_id = %job.job_id, stdout_bytes = stdout.len(), code = ?status.code(), "renderer exited");

                if status.success() {
                    Ok(stderr)
                } else {
                    Err(RenderError::NonZeroExit {
                        code: status.code(),
                        stderr,
                    })
                }
            }
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                Err(RenderError::Wait(e))
            }
            Err(_elapsed) => {
                stdout_task.abort();
                stderr_task.abort();
                if let Err(e) = child.kill().await {
                    warn!(job_id = %job.job_id, error = %e, "failed to kill timed out renderer");
                }
                Err(RenderError::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DoubtreelError::filesystem(dir, e))?;
    std::fs::canonicalize(dir).map_err(|e| DoubtreelError::filesystem(dir, e))
}

/// Read a stream to the end, keeping at most [`MAX_OUTPUT_BYTES`].
///
/// The rest is drained and discarded; closing the pipe early would make the
/// renderer's next write fail with EPIPE.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = handle {
        let _ = (&mut stream)
            .take(MAX_OUTPUT_BYTES)
            .read_to_end(&mut buf)
            .await;
        let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
    }
    buf
}

/// Join a reader task, giving up (and aborting it) at `deadline`.
async fn join_reader(mut task: JoinHandle<Vec<u8>>, deadline: tokio::time::Instant) -> Vec<u8> {
    match tokio::time::timeout_at(deadline, &mut task).await {
        Ok(joined) => joined.unwrap_or_default(),
        Err(_elapsed) => {
            task.abort();
            Vec::new()
        }
    }
}

//! The question-to-video pipeline.
//!
//! ```text
//! build_prompt -> generator -> extract_code -> patch_script --+
//!        |             |                            |         |
//!        +-------------+------- any error ----------+         v
//!                      v                                 RenderExecutor
//!               fallback_script --------------------------------^
//! ```
//!
//! Generation and validation failures are absorbed by the fallback and only
//! logged. Render failures are returned to the caller; a script that fails to
//! render is not retried with the fallback.


use crate::config::{Config, FallbackConfig, JournalConfig};
use crate::error::{DoubtreelError, Result};
use crate::extract::extract;
use crate::fallback::fallback_script;
use crate::generate::{GenerationError, ScriptGenerator};
use crate::journal::{JournalOutcome, JournalRecord, append_record, journal_path};
use crate::patch::{CandidateScript, ScriptOrigin, patch_script};
use crate::prompt::build_prompt;
use crate::render::RenderExecutor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Input to one pipeline invocation.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub question: String,
    pub answer: String,
    pub output_dir: PathBuf,
}

/// A successful invocation.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub job_id: String,
    /// The video file; it existed when the outcome was built.
    pub artifact: PathBuf,
    pub origin: ScriptOrigin,
    /// The generation or validation error the fallback absorbed, if any.
    pub fallback_reason: Option<String>,
    pub elapsed: Duration,
}

/// A script chosen for rendering, with the reason it came from the fallback.
#[derive(Debug, Clone)]
pub struct PreparedScript {
    pub script: CandidateScript,
    pub fallback_reason: Option<String>,
}

/// Prompt, generate, extract, patch, and render, falling back to the
/// template when generation or validation fails.
///
/// Holds no mutable state and can serve concurrent invocations.
pub struct ScenePipeline {
    generator: Arc<dyn ScriptGenerator>,
    executor: RenderExecutor,
    fallback: FallbackConfig,
    journal: JournalConfig,
}

impl ScenePipeline {
    pub fn new(
        generator: Arc<dyn ScriptGenerator>,
        executor: RenderExecutor,
        fallback: FallbackConfig,
        journal: JournalConfig,
    ) -> Self {
        Self {
            generator,
            executor,
            fallback,
            journal,
        }
    }

    /// Build a pipeline around `generator` using the rest of `config`.
    pub fn from_config(config: &Config, generator: Arc<dyn ScriptGenerator>) -> Result<Self> {
        Ok(Self::new(
            generator,
            RenderExecutor::from_config(config)?,
            config.fallback.clone(),
            config.journal.clone(),
        ))
    }

    /// Run the generation path only: no fallback.
    ///
    /// # Errors
    ///
    /// `DoubtreelError::Generation` when the provider fails, and
    /// `DoubtreelError::Validation` when the extracted code lacks the entry
    /// class.
    pub async fn generate_script(&self, question: &str, answer: &str) -> Result<CandidateScript> {
        let prompt = build_prompt(question, answer, self.fallback.lines_per_page)
            .map_err(GenerationError::from)?;
        let response = self.generator.generate(&prompt).await?;
        debug!(generator = self.generator.name(), bytes = response.len(), "generator responded");

        let extraction = extract(&response);
        debug!(rule = extraction.rule.name(), bytes = extraction.code.len(), "extracted code");

        let script = patch_script(&extraction.code)?;
        if !script.applied.is_empty() {
            info!(rules = ?script.applied, "patched generated script");
        }
        Ok(script)
    }

    /// Choose the script to render: the generated one, or the fallback when
    /// generation or validation fails. Never fails.
    pub async fn prepare_script(&self, question: &str, answer: &str) -> PreparedScript {
        match self.generate_script(question, answer).await {
            Ok(script) => PreparedScript {
                script,
                fallback_reason: None,
            },
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "generation path failed; using fallback script");
                PreparedScript {
                    script: fallback_script(question, answer, &self.fallback),
                    fallback_reason: Some(e.to_string()),
                }
            }
        }
    }

    /// Render the fallback script directly, skipping generation.
    pub async fn render_fallback(&self, request: &ScriptRequest) -> Result<RenderOutcome> {
        let prepared = PreparedScript {
            script: fallback_script(&request.question, &request.answer, &self.fallback),
            fallback_reason: None,
        };
        self.render_prepared(request, prepared, Instant::now()).await
    }

    /// Run the whole pipeline for `request`.
    ///
    /// # Errors
    ///
    /// Only render-stage failures surface: `DoubtreelError::Render`, or
    /// `DoubtreelError::Filesystem` when the output directory or script file
    /// cannot be written.
    pub async fn render(&self, request: &ScriptRequest) -> Result<RenderOutcome> {
        let started = Instant::now();
        let prepared = self.prepare_script(&request.question, &request.answer).await;
        self.render_prepared(request, prepared, started).await
    }

    async fn render_prepared(
        &self,
        request: &ScriptRequest,
        prepared: PreparedScript,
        started: Instant,
    ) -> Result<RenderOutcome> {
        let PreparedScript {
            script,
            fallback_reason,
        } = prepared;

        let mut job = match self.executor.prepare(&request.output_dir) {
            Ok(job) => job,
            Err(e) => {
                self.record(
                    &request.output_dir,
                    None,
                    script.origin,
                    Err(&e),
                    fallback_reason,
                    started.elapsed(),
                )
                .await;
                return Err(e);
            }
        };
        let result = self.executor.execute(&mut job, &script).await;
        let elapsed = started.elapsed();

        self.record(
            &request.output_dir,
            Some(&job.job_id),
            script.origin,
            result.as_ref().map(PathBuf::as_path),
            fallback_reason.clone(),
            elapsed,
        )
        .await;

        result.map(|artifact| RenderOutcome {
            job_id: job.job_id,
            artifact,
            origin: script.origin,
            fallback_reason,
            elapsed,
        })
    }

    /// Append the journal record. Failures are logged, never returned.
    ///
    /// `job_id` is `None` when no job could be prepared.
    async fn record(
        &self,
        output_dir: &Path,
        job_id: Option<&str>,
        origin: ScriptOrigin,
        result: std::result::Result<&Path, &DoubtreelError>,
        fallback_reason: Option<String>,
        elapsed: Duration,
    ) {
        if !self.journal.enabled {
            return;
        }

        let mut record = match result {
            Ok(artifact) => JournalRecord::new(origin, JournalOutcome::Succeeded).with_artifact(artifact),
            Err(e) => JournalRecord::new(origin, JournalOutcome::Failed).with_error(e),
        }
        .with_fallback_reason(fallback_reason)
        .with_elapsed(elapsed);
        if let Some(job_id) = job_id {
            record = record.with_job(job_id);
        }

        let path = journal_path(output_dir, &self.journal);
        let appended = tokio::task::spawn_blocking(move || append_record(&path, &record)).await;
        match appended {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(job_id = ?job_id, error = %e, "failed to append render journal"),
            Err(e) => warn!(job_id = ?job_id, error = %e, "render journal task failed"),
        }
    }
}

impl std::fmt::Debug for ScenePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenePipeline")
            .field("generator", &self.generator.name())
            .field("executor", &self.executor)
            .field("fallback", &self.fallback)
            .field("journal", &self.journal)
            .finish()
    }
}

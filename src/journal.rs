//! Append-only render journal.
//!
//! Every pipeline invocation appends one record to
//! `<output_dir>/renders.ndjson` (NDJSON, one JSON object per line):
//!
//! - `ts`: RFC3339 timestamp
//! - `host`: machine that ran the render
//! - `job_id`: render job identifier, absent if no job was started
//! - `origin`: `generated` or `fallback`
//! - `outcome`: `succeeded` or `failed`
//! - `artifact` / `error`: the video path, or why there is none
//! - `fallback_reason`: the generation or validation error absorbed by the
//!   fallback, if any
//! - `elapsed_ms`: wall time of the invocation
//!
//! Journal writes never change the pipeline result; callers log failures.

use crate::config::JournalConfig;
use crate::error::{DoubtreelError, Result};
use crate::patch::ScriptOrigin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Final state of a journaled invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalOutcome {
    Succeeded,
    Failed,
}

/// One line of the render journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub ts: DateTime<Utc>,

    pub host: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    pub origin: ScriptOrigin,

    pub outcome: JournalOutcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    pub elapsed_ms: u64,
}

impl JournalRecord {
    /// Create a record stamped with the current time and host.
    pub fn new(origin: ScriptOrigin, outcome: JournalOutcome) -> Self {
        Self {
            ts: Utc::now(),
            host: host_name(),
            job_id: None,
            origin,
            outcome,
            artifact: None,
            error: None,
            fallback_reason: None,
            elapsed_ms: 0,
        }
    }

    pub fn with_job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_fallback_reason(mut self, reason: Option<String>) -> Self {
        self.fallback_reason = reason;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Serialize the record to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Path of the journal inside `output_dir`.
pub fn journal_path(output_dir: &Path, config: &JournalConfig) -> PathBuf {
    output_dir.join(&config.file_name)
}

/// Append `record` to the journal at `path`, creating the file if needed.
///
/// The line is written with a single `write` on an append-mode handle so
/// records from concurrent jobs do not interleave.
pub fn append_record(path: &Path, record: &JournalRecord) -> Result<()> {
    let mut line = record
        .to_ndjson_line()
        .map_err(|e| DoubtreelError::filesystem(path, e.into()))?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DoubtreelError::filesystem(path, e))?;

    file.write_all(line.as_bytes())
        .map_err(|e| DoubtreelError::filesystem(path, e))?;
    file.sync_all()
        .map_err(|e| DoubtreelError::filesystem(path, e))?;

    Ok(())
}

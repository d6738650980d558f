//! Error types for doubtreel.
//!
//! Each pipeline component owns its own error enum (`GenerationError`,
//! `ValidationError`, `RenderError`); this module folds them into the
//! crate-level [`DoubtreelError`] and maps every variant to an exit code.

use crate::exit_codes;
use crate::generate::GenerationError;
use crate::patch::ValidationError;
use crate::render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for doubtreel operations.
#[derive(Error, Debug)]
pub enum DoubtreelError {
    /// Invalid arguments or configuration.
    #[error("{0}")]
    Config(String),

    /// The generation provider failed and no fallback was allowed.
    #[error("Script generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The extracted script could not be patched into a renderable scene.
    #[error("Script validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The renderer did not produce a video.
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// A directory or file operation failed.
    #[error("filesystem operation failed on '{}': {source}", path.display())]
    Filesystem {
        /// The path being created, written, or removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DoubtreelError {
    /// Build a filesystem error for `path`.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DoubtreelError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DoubtreelError::Config(_) => exit_codes::USER_ERROR,
            DoubtreelError::Generation(_) => exit_codes::GENERATION_FAILURE,
            DoubtreelError::Validation(_) => exit_codes::VALIDATION_FAILURE,
            DoubtreelError::Render(_) => exit_codes::RENDER_FAILURE,
            DoubtreelError::Filesystem { .. } => exit_codes::FILESYSTEM_FAILURE,
        }
    }
}

/// Result type alias for doubtreel operations.
pub type Result<T> = std::result::Result<T, DoubtreelError>;

//! Implementation of the `doubtreel patch` command.
//!
//! Runs extraction and patching over a saved generator response, which is
//! how a failed generation is usually debugged after the fact.

use crate::cli::PatchArgs;
use crate::error::{DoubtreelError, Result};
use crate::extract::extract;
use crate::patch::{CandidateScript, patch_script};
use std::path::Path;

pub(super) fn cmd_patch(args: PatchArgs) -> Result<()> {
    let script = patch_file(&args.file)?;
    if script.applied.is_empty() {
        eprintln!("patched: nothing to do");
    } else {
        for rule in &script.applied {
            eprintln!("patched: {}", rule);
        }
    }
    print!("{}", script.source);
    Ok(())
}

/// Extract and patch the generator response stored at `path`.
///
/// # Errors
///
/// `DoubtreelError::Config` when the file cannot be read, and
/// `DoubtreelError::Validation` (exit code 2) when the extracted code does
/// not define the entry class.
pub fn patch_file(path: &Path) -> Result<CandidateScript> {
    let response = std::fs::read_to_string(path).map_err(|e| {
        DoubtreelError::Config(format!(
            "failed to read response file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let extraction = extract(&response);
    tracing::debug!(rule = extraction.rule.name(), "extracted code");
    Ok(patch_script(&extraction.code)?)
}

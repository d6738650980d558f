//! Structural validation and repair of extracted scripts.
//!
//! [`patch_script`] runs the [`RULES`] table over extracted code. The entry
//! class is never invented here: a script without it is rejected with
//! [`ValidationError::MissingEntrySymbol`] and the caller falls back.

mod rules;


pub use rules::{
    PatchRule, RULES, defines_entry_symbol, has_import_header, has_program_entry,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while validating an extracted script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("script does not define the entry class '{symbol}'")]
    MissingEntrySymbol { symbol: String },
}

/// Where a script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptOrigin {
    /// Generated by a provider, then extracted and patched.
    Generated,
    /// Built by the fallback template.
    Fallback,
}

impl ScriptOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptOrigin::Generated => "generated",
            ScriptOrigin::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ScriptOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script ready to hand to the renderer, with its structural flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScript {
    pub source: String,
    pub origin: ScriptOrigin,
    pub has_entry_symbol: bool,
    pub has_imports: bool,
    pub has_program_entry: bool,
    /// Labels of the patch rules that changed the source, in order.
    pub applied: Vec<String>,
}

impl CandidateScript {
    /// Wrap `source` and compute its flags.
    pub fn inspect(source: String, origin: ScriptOrigin) -> Self {
        Self {
            has_entry_symbol: defines_entry_symbol(&source),
            has_imports: has_import_header(&source),
            has_program_entry: has_program_entry(&source),
            source,
            origin,
            applied: Vec::new(),
        }
    }
}

/// Apply every rule in [`RULES`] to extracted `code`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingEntrySymbol`] if the entry class is not
/// defined.
///
/// # Example
///
/// ```
/// use doubtreel::patch::patch_script;
///
/// let script = patch_script("class DoubtAnimationScene(Scene):\n    pass").unwrap();
/// assert!(script.source.starts_with("from manim import *"));
/// assert!(script.has_program_entry);
/// ```
pub fn patch_script(code: &str) -> Result<CandidateScript, ValidationError> {
    let mut source = code.to_string();
    let mut applied = Vec::new();

    for rule in RULES {
        if let Some(patched) = rule.apply(&source)? {
            source = patched;
            applied.push(rule.label());
        }
    }

    let mut script = CandidateScript::inspect(source, ScriptOrigin::Generated);
    script.applied = applied;
    Ok(script)
}

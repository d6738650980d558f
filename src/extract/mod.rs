//! Recovery of a single code unit from a generator response.
//!
//! Generator output is untrusted text that may wrap the script in fenced
//! blocks, surround it with explanations, or mix the two. Extraction runs in
//! two stages:
//!
//! 1. **Selection**: the rules in [`ExtractionRule::ORDER`] are tried in turn
//!    (fenced `python` block, any fenced block, whole text); the first match
//!    is the candidate.
//! 2. **Normalization**: the candidate is cut to the span between the first
//!    import/class line and the program-entry block, prose lines are
//!    dropped, and the pass repeats until it reaches a fixed point.
//!
//! Normalized output never contains a fence line, so re-extracting it selects
//! the whole text and normalizes it to itself: `extract_code` is idempotent.

mod rules;


pub use rules::{ExtractionRule, is_prose, normalize, normalize_once};

/// The extracted code and the rule that located it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Normalized code.
    pub code: String,
    /// The first rule that matched.
    pub rule: ExtractionRule,
}

/// Extract the code unit from `text`, reporting which rule matched.
pub fn extract(text: &str) -> Extraction {
    for rule in ExtractionRule::ORDER {
        if let Some(candidate) = rule.select(text) {
            return Extraction {
                code: normalize(candidate),
                rule,
            };
        }
    }

    // Boundary always selects, so this is reached only if ORDER omits it.
    Extraction {
        code: normalize(text),
        rule: ExtractionRule::Boundary,
    }
}

/// Extract the code unit from `text`.
pub fn extract_code(text: &str) -> String {
    extract(text).code
}

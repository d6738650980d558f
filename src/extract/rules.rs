//! Ordered candidate-selection rules and the line normalizer.

use regex::Regex;
use std::sync::LazyLock;

/// Prose lines longer than this (in chars) are dropped unless they look like code.
const PROSE_LINE_MIN_CHARS: usize = 50;

static FENCED_PYTHON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*(?:python3?|py)\b[^\n]*\n(.*?)^[ \t]*```")
        .expect("Invalid fenced python regex")
});

static FENCED_ANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[^\n`]*\n(.*?)^[ \t]*```").expect("Invalid fenced block regex")
});

static CODE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:from[ \t]+[\w.]+[ \t]+import\b|import[ \t]+\w|class[ \t]+\w)")
        .expect("Invalid code start regex")
});

static CODE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)if\s+__name__\s*==\s*["']__main__["']\s*:.*?\n\s*\w+\.render\(\)|\w+\.render\(\)\s*\z"#,
    )
    .expect("Invalid code end regex")
});

/// One way of locating the code unit inside a generator response.
///
/// Rules are tried in [`ExtractionRule::ORDER`]; the first that matches
/// supplies the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// A fenced block tagged `python`, `python3`, or `py`.
    FencedPython,
    /// Any fenced block, whatever its tag.
    FencedAny,
    /// The whole response; boundaries are found during normalization.
    Boundary,
}

impl ExtractionRule {
    /// Rules in priority order.
    pub const ORDER: [ExtractionRule; 3] = [
        ExtractionRule::FencedPython,
        ExtractionRule::FencedAny,
        ExtractionRule::Boundary,
    ];

    /// Stable rule name for logs.
    pub fn name(self) -> &'static str {
        match self {
            ExtractionRule::FencedPython => "fenced_python",
            ExtractionRule::FencedAny => "fenced_any",
            ExtractionRule::Boundary => "boundary",
        }
    }

    /// Return this rule's candidate, or `None` when the rule does not apply.
    ///
    /// Fenced rules take the first block only and ignore blocks with no
    /// content. [`ExtractionRule::Boundary`] always applies.
    pub fn select(self, text: &str) -> Option<&str> {
        let fenced = |re: &Regex| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|inner| !inner.trim().is_empty())
        };

        match self {
            ExtractionRule::FencedPython => fenced(&FENCED_PYTHON),
            ExtractionRule::FencedAny => fenced(&FENCED_ANY),
            ExtractionRule::Boundary => Some(text),
        }
    }
}

/// Canonicalize a candidate: repeat [`normalize_once`] until nothing changes.
///
/// Every pass only removes text, so the loop ends; the result is a fixed
/// point of the pass and contains no fence lines.
pub fn normalize(candidate: &str) -> String {
    let mut current = normalize_once(candidate);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// A single normalization pass:
///
/// 1. drop fence marker lines (left over from unclosed blocks)
/// 2. cut everything before the first import or class line
/// 3. cut everything after the program-entry block
/// 4. drop long lines that look like prose
/// 5. trim
pub fn normalize_once(text: &str) -> String {
    let without_fences = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut code = without_fences.as_str();
    if let Some(start) = CODE_START.find(code) {
        code = &code[start.start()..];
    }
    if let Some(end) = CODE_END.find(code) {
        code = &code[..end.end()];
    }

    code.lines()
        .filter(|line| !is_prose(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// A long, unindented line with none of the characters code lines are made of.
///
/// Indented lines sit inside a block (method bodies, list items, continuation
/// lines) and are always kept.
pub fn is_prose(line: &str) -> bool {
    if line.starts_with([' ', '\t']) {
        return false;
    }
    let trimmed = line.trim();
    trimmed.chars().count() > PROSE_LINE_MIN_CHARS
        && !trimmed.contains(['(', ':', '='])
        && !trimmed.starts_with('#')
}

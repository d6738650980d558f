//! The patch rule table.
//!
//! Rules run top to bottom over the whole script. Each either leaves the
//! source alone, rewrites it, or rejects it.

use super::ValidationError;
use crate::scene::{ENTRY_SYMBOL, IMPORT_LINE, PROGRAM_ENTRY};
use regex::Regex;
use std::sync::LazyLock;

static IMPORT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:from[ \t]+manim\b[^\n]*\bimport\b|import[ \t]+manim\b)")
        .expect("Invalid import header regex")
});

static ENTRY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^[ \t]*class[ \t]+{ENTRY_SYMBOL}\b"))
        .expect("Invalid entry class regex")
});

static MAIN_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"if\s+__name__\s*==\s*["']__main__["']"#).expect("Invalid main guard regex")
});

/// One declarative fix applied by [`super::patch_script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRule {
    /// Prepend the Manim import when the script has none.
    ImportHeader,
    /// Reject scripts that do not define the entry class.
    EntrySymbol,
    /// Declare `name = value` at the top of `construct` when `name` is read
    /// but never assigned.
    DefaultVariable {
        name: &'static str,
        value: &'static str,
    },
    /// Rewrite a deprecated call to its current spelling.
    Rename {
        from: &'static str,
        to: &'static str,
    },
    /// Append the program-entry block when the script has none.
    ProgramEntry,
}

/// Rules in application order.
pub const RULES: &[PatchRule] = &[
    PatchRule::ImportHeader,
    PatchRule::EntrySymbol,
    PatchRule::DefaultVariable {
        name: "font_size",
        value: "22",
    },
    PatchRule::DefaultVariable {
        name: "title_font_size",
        value: "36",
    },
    PatchRule::DefaultVariable {
        name: "lines_per_page",
        value: "5",
    },
    PatchRule::Rename {
        from: "ShowCreation(",
        to: "Create(",
    },
    PatchRule::Rename {
        from: "TextMobject(",
        to: "Text(",
    },
    PatchRule::Rename {
        from: "TexMobject(",
        to: "MathTex(",
    },
    PatchRule::Rename {
        from: "TexText(",
        to: "Tex(",
    },
    PatchRule::Rename {
        from: "FadeInFromDown(",
        to: "FadeIn(",
    },
    PatchRule::Rename {
        from: ".get_graph(",
        to: ".plot(",
    },
    PatchRule::ProgramEntry,
];

impl PatchRule {
    /// Label reported in the list of applied rules.
    pub fn label(&self) -> String {
        match self {
            PatchRule::ImportHeader => "import_header".to_string(),
            PatchRule::EntrySymbol => "entry_symbol".to_string(),
            PatchRule::DefaultVariable { name, .. } => format!("default_variable:{name}"),
            PatchRule::Rename { from, .. } => {
                format!("rename:{}", from.trim_start_matches('.').trim_end_matches('('))
            }
            PatchRule::ProgramEntry => "program_entry".to_string(),
        }
    }

    /// Apply the rule. `Ok(None)` means the source needed no change.
    pub fn apply(&self, source: &str) -> Result<Option<String>, ValidationError> {
        match self {
            PatchRule::ImportHeader => Ok((!has_import_header(source))
                .then(|| format!("{IMPORT_LINE}\n\n{}", source.trim_start_matches('\n')))),
            PatchRule::EntrySymbol => {
                if defines_entry_symbol(source) {
                    Ok(None)
                } else {
                    Err(ValidationError::MissingEntrySymbol {
                        symbol: ENTRY_SYMBOL.to_string(),
                    })
                }
            }
            PatchRule::DefaultVariable { name, value } => {
                if reads_variable(source, name) && !assigns_variable(source, name) {
                    Ok(Some(declare_in_construct(source, name, value)))
                } else {
                    Ok(None)
                }
            }
            PatchRule::Rename { from, to } => Ok(rename_calls(source, from, to)),
            PatchRule::ProgramEntry => Ok((!has_program_entry(source))
                .then(|| format!("{}\n\n\n{PROGRAM_ENTRY}", source.trim_end()))),
        }
    }
}

/// Whether the script imports Manim.
pub fn has_import_header(source: &str) -> bool {
    IMPORT_HEADER.is_match(source)
}

/// Whether the script defines the entry class.
pub fn defines_entry_symbol(source: &str) -> bool {
    ENTRY_CLASS.is_match(source)
}

/// Whether the script has a `__main__` guard.
pub fn has_program_entry(source: &str) -> bool {
    MAIN_GUARD.is_match(source)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Code part of a line, without a trailing `#` comment.
fn code_part(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

/// Byte offsets where `name` occurs as a whole identifier in `line`.
fn word_positions<'a>(line: &'a str, name: &'a str) -> impl Iterator<Item = usize> + 'a {
    line.match_indices(name).filter_map(move |(at, _)| {
        let before = line[..at].chars().next_back();
        let after = line[at + name.len()..].chars().next();
        let bounded = !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char);
        bounded.then_some(at)
    })
}

/// `rest` starts with `=` but not `==`, after optional spaces.
fn starts_with_assignment(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.starts_with('=') && !rest.starts_with("==")
}

/// True when `name` is used as a value somewhere: not an attribute, a
/// keyword argument, or an assignment target.
fn reads_variable(source: &str, name: &str) -> bool {
    source.lines().map(code_part).any(|line| {
        word_positions(line, name).any(|at| {
            let attribute = line[..at].ends_with('.');
            let target = starts_with_assignment(&line[at + name.len()..]);
            !attribute && !target
        })
    })
}

/// True when `name` is bound by an assignment, a `for` loop, or a parameter.
fn assigns_variable(source: &str, name: &str) -> bool {
    source.lines().map(code_part).any(|line| {
        let trimmed = line.trim_start();
        if trimmed.starts_with("def ") || trimmed.starts_with("for ") {
            return word_positions(trimmed, name).next().is_some();
        }
        trimmed
            .strip_prefix(name)
            .is_some_and(|rest| starts_with_assignment(rest) || rest.trim_start().starts_with(':'))
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Insert `name = value` as the first statement of the entry class's
/// `construct`, or before the class when it has no `construct`.
fn declare_in_construct(source: &str, name: &str, value: &str) -> String {
    let mut lines: Vec<&str> = source.lines().collect();
    let Some(class_idx) = lines.iter().position(|line| defines_entry_symbol(line)) else {
        return source.to_string();
    };
    let class_indent = indent_of(lines[class_idx]);

    let construct_idx = lines
        .iter()
        .enumerate()
        .skip(class_idx + 1)
        .take_while(|(_, line)| line.trim().is_empty() || indent_of(line) > class_indent)
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            trimmed.starts_with("def construct(") || trimmed.starts_with("def construct (")
        })
        .map(|(idx, _)| idx);

    let declaration;
    match construct_idx {
        Some(def_idx) => {
            let def_indent = indent_of(lines[def_idx]);
            // The signature may continue over several lines; the body starts
            // after the line ending with ':'.
            let header_end = (def_idx..lines.len())
                .find(|&idx| code_part(lines[idx]).trim_end().ends_with(':'))
                .unwrap_or(def_idx);
            let body_indent = lines[header_end + 1..]
                .iter()
                .find(|line| !line.trim().is_empty())
                .map(|line| indent_of(line))
                .filter(|&indent| indent > def_indent)
                .unwrap_or(def_indent + 4);
            declaration = format!("{}{name} = {value}", " ".repeat(body_indent));
            lines.insert(header_end + 1, &declaration);
        }
        None => {
            declaration = format!("{}{name} = {value}", " ".repeat(class_indent));
            lines.insert(class_idx, &declaration);
        }
    }

    let mut patched = lines.join("\n");
    if source.ends_with('\n') {
        patched.push('\n');
    }
    patched
}

/// Replace every call spelled `from` with `to`, skipping occurrences glued
/// to a longer identifier (`MyShowCreation(` is left alone).
fn rename_calls(source: &str, from: &str, to: &str) -> Option<String> {
    let guard_prefix = from.starts_with(is_ident_char);
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut changed = false;

    for (at, _) in source.match_indices(from) {
        if guard_prefix && source[..at].chars().next_back().is_some_and(is_ident_char) {
            continue;
        }
        out.push_str(&source[last..at]);
        out.push_str(to);
        last = at + from.len();
        changed = true;
    }

    changed.then(|| {
        out.push_str(&source[last..]);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_skips_longer_identifiers() {
        assert_eq!(
            rename_calls("ShowCreation(a); MyShowCreation(b)", "ShowCreation(", "Create("),
            Some("Create(a); MyShowCreation(b)".to_string())
        );
        assert_eq!(rename_calls("Create(a)", "ShowCreation(", "Create("), None);
    }

    #[test]
    fn rename_method_call() {
        assert_eq!(
            rename_calls("g = axes.get_graph(f)", ".get_graph(", ".plot("),
            Some("g = axes.plot(f)".to_string())
        );
    }

    #[test]
    fn keyword_arguments_are_not_reads() {
        assert!(!reads_variable("t = Text(\"a\", font_size=22)", "font_size"));
        assert!(reads_variable("t = Text(\"a\", font_size=font_size)", "font_size"));
        assert!(!reads_variable("t.font_size", "font_size"));
        assert!(!reads_variable("# font_size here", "font_size"));
        assert!(!reads_variable("title_font_size + 1", "font_size"));
    }

    #[test]
    fn comparisons_are_reads() {
        assert!(reads_variable("if font_size == 3:", "font_size"));
    }

    #[test]
    fn assignments_loops_and_parameters_bind() {
        assert!(assigns_variable("    font_size = 20", "font_size"));
        assert!(assigns_variable("    font_size: int = 20", "font_size"));
        assert!(assigns_variable("for font_size in sizes:", "font_size"));
        assert!(assigns_variable("def show(self, font_size=22):", "font_size"));
        assert!(!assigns_variable("font_size == 20", "font_size"));
        assert!(!assigns_variable("x = font_size", "font_size"));
    }

    #[test]
    fn declaration_lands_at_top_of_construct() {
        let source = "class DoubtAnimationScene(Scene):\n    def helper(self):\n        pass\n\n    def construct(self):\n        t = Text(\"a\", font_size=font_size)\n";
        let patched = declare_in_construct(source, "font_size", "22");
        assert_eq!(
            patched,
            "class DoubtAnimationScene(Scene):\n    def helper(self):\n        pass\n\n    def construct(self):\n        font_size = 22\n        t = Text(\"a\", font_size=font_size)\n"
        );
    }

    #[test]
    fn declaration_follows_body_indentation() {
        let source = "class DoubtAnimationScene(Scene):\n  def construct(self):\n    self.wait(font_size)";
        let patched = declare_in_construct(source, "font_size", "22");
        assert!(patched.contains("  def construct(self):\n    font_size = 22\n    self.wait"));
    }

    #[test]
    fn declaration_handles_wrapped_signature() {
        let source = "class DoubtAnimationScene(Scene):\n    def construct(\n        self,\n    ):\n        self.wait(font_size)";
        let patched = declare_in_construct(source, "font_size", "22");
        assert!(patched.contains("    ):\n        font_size = 22\n        self.wait"));
    }

    #[test]
    fn declaration_without_construct_goes_before_class() {
        let source = "x = font_size\nclass DoubtAnimationScene(Scene):\n    pass";
        let patched = declare_in_construct(source, "font_size", "22");
        assert_eq!(
            patched,
            "x = font_size\nfont_size = 22\nclass DoubtAnimationScene(Scene):\n    pass"
        );
    }

    #[test]
    fn labels_are_stable() {
        let labels: Vec<String> = RULES.iter().map(PatchRule::label).collect();
        assert_eq!(labels.first().map(String::as_str), Some("import_header"));
        assert!(labels.contains(&"default_variable:font_size".to_string()));
        assert!(labels.contains(&"rename:ShowCreation".to_string()));
        assert!(labels.contains(&"rename:get_graph".to_string()));
        assert_eq!(labels.last().map(String::as_str), Some("program_entry"));
    }
}

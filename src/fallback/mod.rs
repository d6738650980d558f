//! Deterministic scene built straight from the question and answer text.
//!
//! Used whenever generation or validation fails. [`fallback_script`] needs no
//! network, performs no I/O, and cannot fail: every piece of user text is
//! passed through [`escape_literal`] before it lands in a string literal.
//!
//! Text is word-wrapped and paginated here, so the emitted scene shows each
//! page explicitly and clears it before the next one:
//!
//! ```text
//! page = self.show_page(title, [...])
//! self.wait(2)
//! self.clear_page(page)      # every page but the last
//! page = self.show_page(title, [...])
//! ```

mod template;


use crate::config::FallbackConfig;
use crate::patch::{CandidateScript, ScriptOrigin};

/// Escape `text` for embedding between `"` or `"""` delimiters.
///
/// Backslashes are doubled first, every `"` is escaped (so no run of three
/// can close a triple-quoted literal), and line breaks and NUL become
/// escape sequences.
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\x00"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Word-wrap each source line of `text` to at most `max_chars` characters.
///
/// Blank source lines are dropped. A word longer than `max_chars` gets a
/// line of its own rather than being split.
pub fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut wrapped = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_chars = 0;

        for word in source_line.split_whitespace() {
            let word_chars = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_chars = word_chars;
            } else if current_chars + 1 + word_chars > max_chars {
                wrapped.push(std::mem::take(&mut current));
                current.push_str(word);
                current_chars = word_chars;
            } else {
                current.push(' ');
                current.push_str(word);
                current_chars += 1 + word_chars;
            }
        }

        if !current.is_empty() {
            wrapped.push(current);
        }
    }

    wrapped
}

/// Split lines into pages of at most `per_page` lines (minimum one).
pub fn paginate(lines: &[String], per_page: usize) -> Vec<Vec<String>> {
    lines
        .chunks(per_page.max(1))
        .map(<[String]>::to_vec)
        .collect()
}

/// Whether the answer gets the parabola/tangent visual.
fn wants_derivative_visual(answer: &str) -> bool {
    answer.to_lowercase().contains("derivative")
}

/// Emit one titled section, page by page. Returns whether any page was shown.
fn push_section(
    script: &mut String,
    heading: &str,
    color: &str,
    pages: &[Vec<String>],
    page_wait: &str,
) -> bool {
    script.push_str(&format!(
        "        title = self.show_title(\"{}\", {color})\n",
        escape_literal(heading)
    ));

    for (index, page) in pages.iter().enumerate() {
        script.push_str("        page = self.show_page(title, [\n");
        for line in page {
            script.push_str(&format!("            \"{}\",\n", escape_literal(line)));
        }
        script.push_str("        ])\n");
        script.push_str(&format!("        self.wait({page_wait})\n"));
        if index + 1 < pages.len() {
            script.push_str("        self.clear_page(page)\n");
        }
    }

    !pages.is_empty()
}

/// Build the fallback scene for `question` and `answer`.
///
/// The result always defines the entry class and a program-entry block.
///
/// # Example
///
/// ```
/// use doubtreel::config::FallbackConfig;
/// use doubtreel::fallback::fallback_script;
///
/// let script = fallback_script("Why?", "Because \"\"\" is tricky.", &FallbackConfig::default());
/// assert!(script.has_entry_symbol);
/// assert!(script.source.contains(r#"Because \"\"\" is tricky."#));
/// ```
pub fn fallback_script(question: &str, answer: &str, config: &FallbackConfig) -> CandidateScript {
    let question_pages = paginate(
        &wrap_lines(question, config.max_line_chars),
        config.lines_per_page,
    );
    let answer_pages = paginate(
        &wrap_lines(answer, config.max_line_chars),
        config.lines_per_page,
    );
    let derivative = wants_derivative_visual(answer);

    let mut script = String::from(template::HEADER);
    script.push_str(&format!(
        "    question_text = \"\"\"{}\"\"\"\n",
        escape_literal(question)
    ));
    script.push_str(&format!(
        "    answer_text = \"\"\"{}\"\"\"\n",
        escape_literal(answer)
    ));

    script.push_str(template::CONSTRUCT);
    push_section(&mut script, "Question:", "BLUE", &question_pages, "1.5");
    script.push_str("\n        self.clear_all_mobjects()\n\n");
    let answer_shown = push_section(&mut script, "Answer:", "GREEN", &answer_pages, "2");
    if derivative {
        if answer_shown {
            script.push_str("        self.clear_page(page)\n");
        }
        script.push_str("        self.show_derivative_visual()\n");
    }
    script.push_str(template::CONSTRUCT_END);

    script.push_str(template::HELPERS);
    if derivative {
        script.push_str(template::DERIVATIVE_VISUAL);
    }

    script.push_str("\n\n");
    script.push_str(crate::scene::PROGRAM_ENTRY);

    CandidateScript::inspect(script, ScriptOrigin::Fallback)
}

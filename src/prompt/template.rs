//! Placeholder substitution for prompt templates.
//!
//! # Syntax
//!
//! - `{name}` - Substitutes the value bound to `name`
//! - `{{` - Renders as literal `{`
//! - `}}` - Renders as literal `}`
//!
//! Substituted values are inserted verbatim and never re-scanned, so a
//! question containing `{x}` cannot inject a placeholder.
//!
//! Undefined placeholders are an error rather than an empty substitution;
//! a typo in a template constant should fail loudly in tests.

use thiserror::Error;

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder was referenced but not bound.
    #[error("undefined variable '{name}' at position {position} in template")]
    UndefinedVariable {
        /// The name of the undefined variable.
        name: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A `{` was found without a matching `}`.
    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedBrace {
        /// Byte offset of the unmatched `{`.
        position: usize,
    },

    /// An empty placeholder (`{}`) was found.
    #[error("empty variable name '{{}}' at position {position} in template")]
    EmptyVariableName {
        /// Byte offset of the empty placeholder.
        position: usize,
    },
}

/// Render `template`, replacing each `{name}` with its binding in `bindings`.
///
/// ```
/// use doubtreel::prompt::render_template;
///
/// let out = render_template("Q: {question}", &[("question", "Why?")]).unwrap();
/// assert_eq!(out, "Q: Why?");
/// ```
pub fn render_template(template: &str, bindings: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    result.push('{');
                    continue;
                }

                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => name.push(c),
                        None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                    }
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }

                let value = bindings
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| TemplateError::UndefinedVariable {
                        name: name.to_string(),
                        position: pos,
                    })?;
                result.push_str(value);
            }
            '}' => {
                // `}}` collapses to one brace; a lone `}` is literal.
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                }
                result.push('}');
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_substitution() {
        let result = render_template(
            "{greeting}, {name}!",
            &[("name", "Alice"), ("greeting", "Hello")],
        )
        .unwrap();
        assert_eq!(result, "Hello, Alice!");
    }

    #[test]
    fn test_no_variables() {
        let result = render_template("Just plain text", &[]).unwrap();
        assert_eq!(result, "Just plain text");
    }

    #[test]
    fn test_escape_braces() {
        let result = render_template("dict = {{'a': 1}}", &[]).unwrap();
        assert_eq!(result, "dict = {'a': 1}");
    }

    #[test]
    fn test_lone_closing_brace() {
        let result = render_template("a } b", &[]).unwrap();
        assert_eq!(result, "a } b");
    }

    #[test]
    fn test_undefined_variable_error() {
        let err = render_template("Hello {name}", &[]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "name".to_string(),
                position: 6,
            }
        );
    }

    #[test]
    fn test_unmatched_brace_error() {
        let err = render_template("Hello {name", &[]).unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedBrace { position: 6 });
    }

    #[test]
    fn test_empty_variable_name_error() {
        let err = render_template("Hello {}", &[]).unwrap_err();
        assert_eq!(err, TemplateError::EmptyVariableName { position: 6 });
    }

    #[test]
    fn test_whitespace_in_variable_name() {
        let result = render_template("Hello { name }!", &[("name", "Alice")]).unwrap();
        assert_eq!(result, "Hello Alice!");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let result = render_template("Q: {question}", &[("question", "what is {x}?")]).unwrap();
        assert_eq!(result, "Q: what is {x}?");
    }

    #[test]
    fn test_multiline_values() {
        let result = render_template("A:\n{answer}", &[("answer", "line1\nline2")]).unwrap();
        assert_eq!(result, "A:\nline1\nline2");
    }

    #[test]
    fn test_unicode_in_template_and_values() {
        let result = render_template("∂ {text}", &[("text", "日本語")]).unwrap();
        assert_eq!(result, "∂ 日本語");
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::UnmatchedBrace { position: 5 };
        assert_eq!(err.to_string(), "unmatched '{' at position 5 in template");

        let err = TemplateError::EmptyVariableName { position: 3 };
        assert_eq!(
            err.to_string(),
            "empty variable name '{}' at position 3 in template"
        );
    }
}

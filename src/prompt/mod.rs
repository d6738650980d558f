//! Prompt generation for the scene-script generator.
//!
//! This module provides:
//!
//! - **Template**: `{placeholder}` substitution used by the prompt constants
//! - **Builder**: composition of the system and user messages from a
//!   question, its answer, and the fixed scene constraints
//!
//! # Template Syntax
//!
//! ```text
//! The student has asked: "{question}"
//! ```
//!
//! Use `{{` to escape and render a literal `{`.

mod builder;
mod template;

pub use builder::{ScenePrompt, build_prompt};
pub use template::{TemplateError, render_template};

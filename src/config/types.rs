//! Configuration types and defaults for doubtreel.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config sections.

use serde::{Deserialize, Serialize};

/// Text-generation provider bound to the pipeline at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// OpenAI-compatible chat completions hosted by Groq (default).
    #[default]
    Groq,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl Provider {
    /// Parse a provider from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "groq" => Some(Self::Groq),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// Model used when the config does not name one.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "qwen-2.5-coder-32b",
            Provider::Gemini => "gemini-2.0-flash",
        }
    }

    /// Environment variable holding the API key when the config does not name one.
    pub fn default_api_key_env(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Base URL of the provider's HTTP API.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Groq => write!(f, "groq"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

/// Render quality preset passed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// 480p15.
    Low,
    /// 720p30 (default).
    #[default]
    Medium,
    /// 1080p60.
    High,
    /// 1440p60.
    Production,
    /// 2160p60.
    #[serde(rename = "4k")]
    FourK,
}

impl Quality {
    /// The renderer flag selecting this preset.
    pub fn flag(self) -> &'static str {
        match self {
            Quality::Low => "-ql",
            Quality::Medium => "-qm",
            Quality::High => "-qh",
            Quality::Production => "-qp",
            Quality::FourK => "-qk",
        }
    }
}

// Default value functions for serde
pub(crate) fn default_temperature() -> f32 {
    0.2
}
pub(crate) fn default_max_tokens() -> u32 {
    4000
}
pub(crate) fn default_request_timeout_seconds() -> u64 {
    120
}
pub(crate) fn default_renderer_command() -> String {
    "python -m manim".to_string()
}
pub(crate) fn default_render_timeout_seconds() -> u64 {
    600
}
pub(crate) fn default_lines_per_page() -> usize {
    5
}
pub(crate) fn default_max_line_chars() -> usize {
    60
}
pub(crate) fn default_journal_file_name() -> String {
    "renders.ndjson".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}

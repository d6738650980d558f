//! Config struct definitions and default implementations.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for doubtreel.
///
/// This struct represents the contents of `doubtreel.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text-generation provider settings.
    pub generation: GenerationConfig,

    /// External renderer settings.
    pub renderer: RendererConfig,

    /// Fallback template layout settings.
    pub fallback: FallbackConfig,

    /// Render journal settings.
    pub journal: JournalConfig,
}

/// Settings for the text-generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Which provider implementation is bound to the pipeline.
    pub provider: Provider,

    /// Model name; the provider's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key; the provider's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Base URL override (self-hosted gateways, test servers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout for the generation call.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key_env: None,
            base_url: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Settings for the external renderer subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Renderer invocation prefix (shell-words parsed; no shell).
    #[serde(default = "default_renderer_command")]
    pub command: String,

    /// Quality preset.
    pub quality: Quality,

    /// Deadline after which the renderer is killed.
    #[serde(default = "default_render_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Directory for ephemeral scripts; `<temp>/doubtreel` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: default_renderer_command(),
            quality: Quality::default(),
            timeout_seconds: default_render_timeout_seconds(),
            scratch_dir: None,
        }
    }
}

/// Layout of the fallback template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Maximum text lines shown at once.
    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,

    /// Word-wrap width in characters.
    #[serde(default = "default_max_line_chars")]
    pub max_line_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            lines_per_page: default_lines_per_page(),
            max_line_chars: default_max_line_chars(),
        }
    }
}

/// Settings for the NDJSON render journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Whether each pipeline invocation appends a journal record.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Journal file name inside the output directory.
    #[serde(default = "default_journal_file_name")]
    pub file_name: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            file_name: default_journal_file_name(),
        }
    }
}

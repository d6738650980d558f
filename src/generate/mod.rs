//! Script generation through an external text-generation provider.
//!
//! The pipeline talks to providers only through [`ScriptGenerator`], so the
//! two HTTP implementations (OpenAI-compatible chat completions and Gemini
//! `generateContent`) are interchangeable, and tests substitute scripted
//! generators. The bound implementation is chosen once, from config, by
//! [`build_generator`].
//!
//! No retries happen at this layer: any failure becomes a
//! [`GenerationError`] and the pipeline falls back to the template script.

mod gemini;
mod http;
mod openai_compat;

#[cfg(test)]
mod test_server;

pub use gemini::GeminiGenerator;
pub use openai_compat::OpenAiCompatGenerator;

use crate::config::{Config, Provider};
use crate::error::Result;
use crate::prompt::{ScenePrompt, TemplateError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from the generation layer. All of them are recoverable by the
/// pipeline's fallback path.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider rejected the request for rate or quota reasons.
    #[error("provider quota exhausted ({status}): {body}")]
    QuotaExhausted {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider returned a non-2xx status code.
    #[error("provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered but produced no text.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The prompt could not be composed.
    #[error("failed to build prompt: {0}")]
    Prompt(#[from] TemplateError),

    /// Generation is switched off for this invocation.
    #[error("generation unavailable: {0}")]
    Unavailable(String),
}

/// A capability that turns a scene prompt into raw (untrusted) text.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Short identifier used in logs and the render journal.
    fn name(&self) -> &str;

    /// Generate raw script text for `prompt`.
    ///
    /// Implementations must return [`GenerationError::EmptyResponse`] rather
    /// than `Ok` with blank text.
    async fn generate(&self, prompt: &ScenePrompt) -> std::result::Result<String, GenerationError>;
}

/// Generator that never produces text; binds the pipeline to the fallback
/// template (`--fallback-only`).
#[derive(Debug, Clone, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl ScriptGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &ScenePrompt) -> std::result::Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "generation disabled for this run".to_string(),
        ))
    }
}

/// Settings shared by the HTTP providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ProviderSettings {
    /// Resolve provider settings from config, reading the API key from the
    /// environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url(),
            api_key: config.api_key()?,
            model: config.model(),
            temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
            request_timeout: Duration::from_secs(config.generation.request_timeout_seconds),
        })
    }
}

/// Build the generator selected by `config.generation.provider`.
pub fn build_generator(config: &Config) -> Result<Arc<dyn ScriptGenerator>> {
    let settings = ProviderSettings::from_config(config)?;
    let generator: Arc<dyn ScriptGenerator> = match config.generation.provider {
        Provider::Groq => Arc::new(OpenAiCompatGenerator::new(settings)?),
        Provider::Gemini => Arc::new(GeminiGenerator::new(settings)?),
    };
    tracing::debug!(provider = generator.name(), model = %config.model(), "generator bound");
    Ok(generator)
}

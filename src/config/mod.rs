//! Configuration model for doubtreel.
//!
//! This module defines the Config struct that represents `doubtreel.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.
//! Secrets never live in the YAML: API keys come from the environment
//! (optionally seeded from a `.env` file).

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{Config, FallbackConfig, GenerationConfig, JournalConfig, RendererConfig};
pub use operations::DEFAULT_CONFIG_FILE;
pub use types::{Provider, Quality};

//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{DoubtreelError, Result};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "doubtreel.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(DoubtreelError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DoubtreelError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the config for a CLI invocation.
    ///
    /// An explicit path must exist. Without one, `doubtreel.yaml` in the
    /// working directory is used when present, and defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                DoubtreelError::Config(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DoubtreelError::Config(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `fallback.lines_per_page` must be positive
    /// - `fallback.max_line_chars` must be at least 10
    /// - `renderer.timeout_seconds` and `generation.request_timeout_seconds` must be positive
    /// - `renderer.command` must parse into at least one word
    /// - `generation.temperature` must lie in `0.0..=2.0`
    pub fn validate(&self) -> Result<()> {
        if self.fallback.lines_per_page == 0 {
            return Err(DoubtreelError::Config(
                "config validation failed: fallback.lines_per_page must be greater than 0"
                    .to_string(),
            ));
        }

        if self.fallback.max_line_chars < 10 {
            return Err(DoubtreelError::Config(format!(
                "config validation failed: fallback.max_line_chars must be at least 10 (found {})",
                self.fallback.max_line_chars
            )));
        }

        if self.renderer.timeout_seconds == 0 {
            return Err(DoubtreelError::Config(
                "config validation failed: renderer.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if self.generation.request_timeout_seconds == 0 {
            return Err(DoubtreelError::Config(
                "config validation failed: generation.request_timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(DoubtreelError::Config(format!(
                "config validation failed: generation.temperature must be between 0.0 and 2.0 (found {})",
                self.generation.temperature
            )));
        }

        self.renderer_argv()?;

        Ok(())
    }

    /// Split `renderer.command` into program and leading arguments.
    pub fn renderer_argv(&self) -> Result<Vec<String>> {
        let argv = shell_words::split(&self.renderer.command).map_err(|e| {
            DoubtreelError::Config(format!(
                "failed to parse renderer.command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                self.renderer.command, e
            ))
        })?;

        if argv.is_empty() {
            return Err(DoubtreelError::Config(
                "config validation failed: renderer.command is empty".to_string(),
            ));
        }

        Ok(argv)
    }

    /// Directory holding ephemeral scripts.
    pub fn scratch_dir(&self) -> PathBuf {
        self.renderer
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("doubtreel"))
    }

    /// Model name for the configured provider.
    pub fn model(&self) -> String {
        self.generation
            .model
            .clone()
            .unwrap_or_else(|| self.generation.provider.default_model().to_string())
    }

    /// Base URL for the configured provider.
    pub fn base_url(&self) -> String {
        self.generation
            .base_url
            .clone()
            .unwrap_or_else(|| self.generation.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Name of the environment variable holding the provider API key.
    pub fn api_key_env(&self) -> String {
        self.generation
            .api_key_env
            .clone()
            .unwrap_or_else(|| self.generation.provider.default_api_key_env().to_string())
    }

    /// Read the provider API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        let var = self.api_key_env();
        match std::env::var(&var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DoubtreelError::Config(format!(
                "{} environment variable is not set\n\
                 Fix: export {}=<key> or add it to a .env file, or pass --fallback-only.",
                var, var
            ))),
        }
    }
}

//! Pipeline configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Secrets are never read from here; the API key is supplied separately.

use std::path::Path;

use bloodwise_core::models::default_parameters;
use bloodwise_core::retrieval::DEFAULT_RETRIEVAL_LIMIT;
use bloodwise_core::NumericPattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::completion::RetryPolicy;
use crate::narrative::StreamingConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Chat completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Everything the report pipeline can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Parameters to extract, in output order.
    pub parameters: Vec<String>,
    pub numeric_pattern: NumericPattern,
    /// Passages retrieved per parameter.
    pub retrieval_limit: usize,
    pub streaming: StreamingConfig,
    pub retry: RetryPolicy,
    pub completion: CompletionSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parameters: default_parameters(),
            numeric_pattern: NumericPattern::default(),
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
            streaming: StreamingConfig::default(),
            retry: RetryPolicy::default(),
            completion: CompletionSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.parameters.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("parameter names must not be blank".into()));
        }
        if self.retrieval_limit == 0 {
            return Err(ConfigError::Invalid("retrieval_limit must be at least 1".into()));
        }
        if !self.retry.multiplier.is_finite() {
            return Err(ConfigError::Invalid("retry.multiplier must be finite".into()));
        }
        Ok(())
    }
}

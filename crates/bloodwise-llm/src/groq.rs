//! Groq chat completions client (OpenAI-compatible API).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::{CompletionError, CompletionResult, Completor};
use crate::config::{CompletionSettings, ConfigError, ConfigResult};

/// Explicit client configuration. Built once at process start.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>, settings: &CompletionSettings) -> Self {
        Self {
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// Blocking HTTP completor.
pub struct GroqClient {
    client: reqwest::blocking::Client,
    config: GroqConfig,
}

impl GroqClient {
    pub fn new(mut config: GroqConfig) -> ConfigResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("API key is empty".into()));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl Completor for GroqClient {
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    CompletionError::Unavailable(format!("cannot connect to {}", self.config.base_url))
                } else if e.is_timeout() {
                    CompletionError::Unavailable(format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    CompletionError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::ResponseParsing("no completion choices".into()))?;

        debug!(model = %self.config.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

fn status_error(status: u16, body: String) -> CompletionError {
    let detail = format!("HTTP {}: {}", status, body);
    match status {
        401 | 403 => CompletionError::Auth(detail),
        429 => CompletionError::RateLimited(detail),
        500..=599 => CompletionError::Unavailable(detail),
        _ => CompletionError::ResponseParsing(detail),
    }
}

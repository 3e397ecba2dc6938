//! Text completion seam.
//!
//! Everything model-facing goes through [`Completor`]: prompt in, text out,
//! no format guarantee on the text.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Completion errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Completion service unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),
}

impl CompletionError {
    /// Whether a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::Unavailable(_) | CompletionError::RateLimited(_)
        )
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Generates free text for a prompt.
pub trait Completor {
    fn complete(&self, prompt: &str) -> CompletionResult<String>;
}

impl<C: Completor + ?Sized> Completor for &C {
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        (**self).complete(prompt)
    }
}

impl<C: Completor + ?Sized> Completor for Box<C> {
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        (**self).complete(prompt)
    }
}

// =========================================================================
// Retry
// =========================================================================

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first. 0 is treated as 1.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.saturating_sub(1) as i32);
        let ms = (self.initial_backoff_ms as f64 * factor).min(u64::MAX as f64);
        Duration::from_millis(ms as u64)
    }
}

/// Retries transient failures of the wrapped completor.
pub struct RetryingCompletor<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: Completor> RetryingCompletor<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<C: Completor> Completor for RetryingCompletor<C> {
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.complete(prompt) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "completion failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// =========================================================================
// Test doubles
// =========================================================================

/// Completor answering from a function of the prompt.
///
/// Useful for tests and offline runs: the function sees the whole prompt and
/// can pick the answer for the parameter named in it.
pub struct MockCompletor<F> {
    respond: F,
    calls: AtomicUsize,
}

impl<F> MockCompletor<F>
where
    F: Fn(&str) -> CompletionResult<String>,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> Completor for MockCompletor<F>
where
    F: Fn(&str) -> CompletionResult<String>,
{
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(prompt)
    }
}

/// Completor that answers with canned text keyed by a substring of the prompt.
///
/// The first rule whose key occurs in the prompt wins; prompts matching no
/// rule get the fallback text.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCompletor {
    rules: Vec<(String, String)>,
    fallback: String,
}

impl ScriptedCompletor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((key.into(), text.into()));
        self
    }

    pub fn fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }
}

impl Completor for ScriptedCompletor {
    fn complete(&self, prompt: &str) -> CompletionResult<String> {
        let text = self
            .rules
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, text)| text.clone())
            .unwrap_or_else(|| self.fallback.clone());
        Ok(text)
    }
}

/// Completor that always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingCompletor(pub CompletionError);

impl Completor for FailingCompletor {
    fn complete(&self, _prompt: &str) -> CompletionResult<String> {
        Err(self.0.clone())
    }
}

//! Risk narrative generation and paced fragment streaming.

use std::time::Duration;

use bloodwise_core::RiskMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::completion::{CompletionError, Completor};
use crate::prompts::make_narrative_prompt;

/// Default fragment length in characters.
pub const DEFAULT_FRAGMENT_SIZE: usize = 15;

/// Default pause between fragments.
pub const DEFAULT_FRAGMENT_DELAY_MS: u64 = 100;

/// Narrative errors.
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Completion unavailable while describing risks: {0}")]
    CompletionUnavailable(#[from] CompletionError),
}

pub type NarrativeResult<T> = Result<T, NarrativeError>;

/// Describes a [`RiskMap`] in plain language with one completion call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeGenerator;

impl NarrativeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Raw completion text for the risk table, unmodified.
    pub fn describe<C>(&self, risks: &RiskMap, completor: &C) -> NarrativeResult<String>
    where
        C: Completor + ?Sized,
    {
        info!(conditions = risks.len(), "generating narrative");
        let prompt = make_narrative_prompt(risks);
        let text = completor.complete(&prompt)?;
        info!(chars = text.chars().count(), "narrative generated");
        Ok(text)
    }
}

/// Fragment pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Characters per fragment. 0 is treated as 1.
    pub fragment_size: usize,
    /// Pause before every fragment after the first. 0 disables pacing.
    pub fragment_delay_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            fragment_delay_ms: DEFAULT_FRAGMENT_DELAY_MS,
        }
    }
}

impl StreamingConfig {
    /// No pacing, default fragment size.
    pub fn unpaced() -> Self {
        Self {
            fragment_delay_ms: 0,
            ..Self::default()
        }
    }
}

/// Lazy, paced fragments of finished text.
///
/// Sleeps happen inside `next`, so dropping the iterator stops emission at once.
/// Restart by calling [`fragments`] again.
pub struct FragmentStream<'a> {
    rest: &'a str,
    size: usize,
    delay: Duration,
    started: bool,
}

/// Split `text` into fragments of `config.fragment_size` characters.
pub fn fragments<'a>(text: &'a str, config: &StreamingConfig) -> FragmentStream<'a> {
    FragmentStream {
        rest: text,
        size: config.fragment_size.max(1),
        delay: Duration::from_millis(config.fragment_delay_ms),
        started: false,
    }
}

impl<'a> Iterator for FragmentStream<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        if self.started && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.started = true;

        let end = self
            .rest
            .char_indices()
            .nth(self.size)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (fragment, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{FailingCompletor, MockCompletor};
    use bloodwise_core::{classify, ValueMap};
    use std::time::Instant;

    #[test]
    fn test_describe_returns_raw_text() {
        let completor = MockCompletor::new(|prompt: &str| {
            assert!(prompt.contains("Gout: Low"));
            Ok("  • Gout: low risk  ".to_string())
        });
        let text = NarrativeGenerator::new()
            .describe(&classify(&ValueMap::new()), &completor)
            .unwrap();
        assert_eq!(text, "  • Gout: low risk  ");
        assert_eq!(completor.calls(), 1);
    }

    #[test]
    fn test_describe_failure() {
        let completor = FailingCompletor(CompletionError::Unavailable("timeout".into()));
        let err = NarrativeGenerator::new()
            .describe(&classify(&ValueMap::new()), &completor)
            .unwrap_err();
        assert!(matches!(err, NarrativeError::CompletionUnavailable(_)));
    }

    #[test]
    fn test_fragment_sizes() {
        let text = "a".repeat(40);
        let parts: Vec<_> = fragments(&text, &StreamingConfig::unpaced()).collect();
        let lengths: Vec<_> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(lengths, vec![15, 15, 10]);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_fragments_count_characters() {
        let text = "µg/dL → ok";
        let config = StreamingConfig {
            fragment_size: 3,
            fragment_delay_ms: 0,
        };
        let parts: Vec<_> = fragments(text, &config).collect();
        assert_eq!(parts, vec!["µg/", "dL ", "→ o", "k"]);
    }

    #[test]
    fn test_empty_text_has_no_fragments() {
        assert_eq!(fragments("", &StreamingConfig::default()).count(), 0);
    }

    #[test]
    fn test_restart_yields_same_fragments() {
        let config = StreamingConfig::unpaced();
        let text = "Cardiovascular Disease: Moderate";
        let first: Vec<_> = fragments(text, &config).collect();
        let second: Vec<_> = fragments(text, &config).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pacing_between_fragments() {
        let config = StreamingConfig {
            fragment_size: 2,
            fragment_delay_ms: 20,
        };
        let start = Instant::now();
        let count = fragments("abcdef", &config).count();
        assert_eq!(count, 3);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_first_fragment_is_immediate() {
        let config = StreamingConfig {
            fragment_size: 5,
            fragment_delay_ms: 10_000,
        };
        let start = Instant::now();
        let first = fragments("hello world", &config).next();
        assert_eq!(first, Some("hello"));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

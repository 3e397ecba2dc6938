//! Numeric value parsing for free-form model responses.
//!
//! The pattern is a versioned contract, independent of prompt wording:
//!
//! - [`NumericPattern::Strict`] (v1): a number immediately preceded by `:` or
//!   whitespace and followed by whitespace, end of text or a word boundary. A
//!   decimal running straight into a letter falls back to its integer part.
//! - [`NumericPattern::Delimited`] (v2, default): a number preceded by start of
//!   text or any character other than a letter, digit or `.`; the longest
//!   number is taken regardless of what follows.
//!
//! In both versions the first match scanning left to right wins.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Numeric extraction pattern version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPattern {
    Strict,
    #[default]
    Delimited,
}

fn strict_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid strict numeric regex"))
}

fn delimited_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\p{L}\p{N}.])([0-9]+(?:\.[0-9]+)?)").expect("valid delimited numeric regex")
    })
}

impl NumericPattern {
    /// First number-like substring in `text`, as written.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            NumericPattern::Strict => find_strict(text),
            NumericPattern::Delimited => delimited_regex()
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
        }
    }

    /// Parsed value of [`Self::find`].
    pub fn parse(&self, text: &str) -> Option<f64> {
        self.find(text).and_then(|s| s.parse::<f64>().ok())
    }

    /// Stable version tag.
    pub fn version(&self) -> &'static str {
        match self {
            NumericPattern::Strict => "v1-strict",
            NumericPattern::Delimited => "v2-delimited",
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `end` is at end of text or followed by a non-word character.
fn ends_at_boundary(text: &str, end: usize) -> bool {
    text[end..].chars().next().map_or(true, |c| !is_word_char(c))
}

fn find_strict(text: &str) -> Option<&str> {
    for m in strict_regex().find_iter(text) {
        let after_separator = text[..m.start()]
            .chars()
            .next_back()
            .map_or(false, |c| c == ':' || c.is_whitespace());
        if !after_separator {
            continue;
        }
        if ends_at_boundary(text, m.end()) {
            return Some(m.as_str());
        }
        // Decimal running into a word character: the integer part is
        // followed by '.', which is always a boundary.
        if let Some(dot) = m.as_str().find('.') {
            return Some(&m.as_str()[..dot]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_examples() {
        let p = NumericPattern::Delimited;
        assert_eq!(p.find("Sodium level: 138 mmol/L"), Some("138"));
        assert_eq!(p.find("value=140.5units"), Some("140.5"));
        assert_eq!(p.find("no numeric data available"), None);
    }

    #[test]
    fn test_delimited_skips_embedded_digits() {
        let p = NumericPattern::Delimited;
        assert_eq!(p.find("vitamin b12: 350 pg/mL"), Some("350"));
        assert_eq!(p.find("42 at start"), Some("42"));
        assert_eq!(p.find("CREATININE: 1.5 mg/dL"), Some("1.5"));
        assert_eq!(p.parse("Platelets (250000)"), Some(250000.0));
    }

    #[test]
    fn test_strict_requires_colon_or_space() {
        let p = NumericPattern::Strict;
        assert_eq!(p.find("Sodium level: 138 mmol/L"), Some("138"));
        assert_eq!(p.find("Creatinine:1.5"), Some("1.5"));
        assert_eq!(p.find("value=140.5units"), None);
        assert_eq!(p.find("42 at start"), None);
        assert_eq!(p.find("no numeric data available"), None);
    }

    #[test]
    fn test_strict_decimal_falls_back_to_integer() {
        let p = NumericPattern::Strict;
        assert_eq!(p.find("T4: 7.8ug/dL"), Some("7"));
        assert_eq!(p.find("count 12abc then 9"), Some("9"));
        assert_eq!(p.find("Result: 6.2, normal"), Some("6.2"));
        assert_eq!(p.find("x 12x3.4 then: 1.2.3"), Some("1.2"));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(NumericPattern::Delimited.find("BUN: 25 (ref 7 - 20)"), Some("25"));
        assert_eq!(NumericPattern::Strict.find("BUN: 25 (ref 7 - 20)"), Some("25"));
    }
}

//! In-memory fuzzy keyword retriever.
//!
//! Scores each segment by how well every query term matches some word in the
//! segment (Jaro-Winkler), so OCR noise and spelling variants still match.

use strsim::jaro_winkler;

use super::{RetrievalResult, Retriever};
use crate::models::Segment;

/// Default number of segments returned per query.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 4;

/// Minimum average term similarity for a segment to be returned.
const MIN_SCORE: f64 = 0.80;

/// Retriever over a fixed list of segments.
pub struct LexicalRetriever {
    segments: Vec<Segment>,
    limit: usize,
}

impl LexicalRetriever {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    /// Build from raw chunk texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Segment::new).collect())
    }

    /// Change the number of segments returned per query.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Score a segment against query terms (0.0 - 1.0).
    fn score(terms: &[String], segment: &Segment) -> f64 {
        let words = tokenize(&segment.text);
        if words.is_empty() {
            return 0.0;
        }

        let total: f64 = terms
            .iter()
            .map(|term| {
                words
                    .iter()
                    .map(|w| jaro_winkler(term, w))
                    .fold(0.0, f64::max)
            })
            .sum();

        total / terms.len() as f64
    }
}

impl Retriever for LexicalRetriever {
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, &Segment)> = self
            .segments
            .iter()
            .map(|s| (Self::score(&terms, s), s))
            .filter(|(score, _)| *score >= MIN_SCORE)
            .collect();

        // Stable sort keeps document order between equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(self.limit)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

/// Lowercase alphanumeric words.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

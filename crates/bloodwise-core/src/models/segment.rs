//! Text segments returned by retrievers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A passage of report text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Where the segment is stored, when it came from a store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SegmentSource>,
}

/// Store location of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSource {
    /// Segment ID (UUID)
    pub segment_id: String,
    /// Owning document ID (UUID)
    pub document_id: String,
    /// Position within the document, starting at 0
    pub position: usize,
}

impl Segment {
    /// A bare segment with no store metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }
}

/// A report document held in the segment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Document ID (UUID)
    pub document_id: String,
    /// Caller-supplied label, usually the file name
    pub title: Option<String>,
    /// SHA-256 over the segment texts, see [`segments_digest`]
    pub digest: String,
    /// Number of stored segments
    pub segment_count: usize,
    /// Creation timestamp
    pub created_at: String,
}

/// Hex SHA-256 over segment texts, each length-prefixed so boundaries count.
pub fn segments_digest<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for text in texts {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Join segment texts, one per line, order preserved.
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments() {
        let segments = vec![Segment::new("Creatinine: 1.5"), Segment::new("BUN: 25")];
        assert_eq!(join_segments(&segments), "Creatinine: 1.5\nBUN: 25");
        assert_eq!(join_segments(&[]), "");
    }

    #[test]
    fn test_digest_respects_boundaries() {
        let a = segments_digest(["ab", "c"]);
        let b = segments_digest(["a", "bc"]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, segments_digest(vec!["ab", "c"]));
    }
}

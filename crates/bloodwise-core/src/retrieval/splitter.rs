//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present (paragraph, line, word, character),
//! recursing into pieces that are still too long, then merges neighbours back
//! into chunks of at most `chunk_size` characters with `chunk_overlap`
//! characters carried between consecutive chunks.

use std::collections::VecDeque;

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Text splitter producing overlapping chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    /// Create a splitter. Overlap is clamped below the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (index, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_empty() || text.contains(**s))
            .map(|(i, s)| (i, *s))
            .unwrap_or((separators.len().saturating_sub(1), ""));
        let finer = &separators[(index + 1).min(separators.len())..];

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joined_len = |current: &VecDeque<&str>| if current.is_empty() { 0 } else { sep_len };

            if total + len + joined_len(&current) > self.chunk_size && !current.is_empty() {
                push_chunk(&mut chunks, &current, separator);
                while total > self.chunk_overlap
                    || (total + len + joined_len(&current) > self.chunk_size && total > 0)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + joined_len(&current);
            current.push_back(piece);
        }
        push_chunk(&mut chunks, &current, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, current: &VecDeque<&str>, separator: &str) {
    let joined = current.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

//! Retrieval of report passages relevant to a parameter query.
//!
//! The extractor only depends on the [`Retriever`] trait. Implementations:
//! - [`crate::db::DocumentRetriever`]: SQLite FTS5 store, BM25 ranking
//!   (owned form wraps in `Mutex` for threaded callers)
//! - [`LexicalRetriever`]: in-memory fuzzy keyword matching
//!
//! Neither ranking nor result count is stable across implementations.

mod lexical;
mod splitter;

pub use lexical::*;
pub use splitter::*;

use std::sync::Mutex;

use thiserror::Error;

use crate::models::Segment;

/// Retrieval errors.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Retriever backend error: {0}")]
    Backend(String),
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Source of text segments for a free-text query.
pub trait Retriever {
    /// Segments likely relevant to `query`, most relevant first.
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>>;
}

impl<R: Retriever + ?Sized> Retriever for &R {
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>> {
        (**self).search(query)
    }
}

impl<R: Retriever + ?Sized> Retriever for Box<R> {
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>> {
        (**self).search(query)
    }
}

/// Serializes access so a non-`Sync` retriever can be shared across threads.
impl<R: Retriever> Retriever for Mutex<R> {
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>> {
        let retriever = self
            .lock()
            .map_err(|e| RetrievalError::LockPoisoned(e.to_string()))?;
        retriever.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl Retriever for Fixed {
        fn search(&self, _query: &str) -> RetrievalResult<Vec<Segment>> {
            Ok(self.0.iter().map(|t| Segment::new(*t)).collect())
        }
    }

    #[test]
    fn test_mutex_retriever_delegates() {
        let retriever = Mutex::new(Fixed(vec!["a", "b"]));
        let segments = retriever.search("anything").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "b");
    }

    #[test]
    fn test_boxed_retriever_delegates() {
        let retriever: Box<dyn Retriever> = Box::new(Fixed(vec!["only"]));
        assert_eq!(retriever.search("q").unwrap()[0].text, "only");
    }
}

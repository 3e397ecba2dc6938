//! Parameter value extraction from retrieved report passages.
//!
//! Per query: retrieve, join passages, prompt, complete, parse one number.
//! Queries never see each other's results, so the concurrent path returns
//! exactly what the sequential one does.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bloodwise_core::models::join_segments;
use bloodwise_core::{ExtractedValue, NumericPattern, RetrievalError, Retriever, ValueMap};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::completion::{CompletionError, Completor};
use crate::prompts::make_extraction_prompt;

/// Extraction errors. Both variants abort the remaining queries and keep the
/// values extracted before the failing one.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Completion unavailable while extracting {query}: {source}")]
    CompletionUnavailable {
        query: String,
        partial: ValueMap,
        source: CompletionError,
    },

    #[error("Retrieval failed for {query}: {source}")]
    Retrieval {
        query: String,
        partial: ValueMap,
        source: RetrievalError,
    },
}

impl ExtractionError {
    /// The query that failed.
    pub fn query(&self) -> &str {
        match self {
            ExtractionError::CompletionUnavailable { query, .. }
            | ExtractionError::Retrieval { query, .. } => query,
        }
    }

    /// Values extracted before the failure.
    pub fn partial(&self) -> &ValueMap {
        match self {
            ExtractionError::CompletionUnavailable { partial, .. }
            | ExtractionError::Retrieval { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> ValueMap {
        match self {
            ExtractionError::CompletionUnavailable { partial, .. }
            | ExtractionError::Retrieval { partial, .. } => partial,
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Adapter failure for a single query, before it is tied to a partial map.
#[derive(Debug)]
enum QueryFailure {
    Retrieval(RetrievalError),
    Completion(CompletionError),
}

impl QueryFailure {
    fn into_error(self, query: &str, partial: ValueMap) -> ExtractionError {
        let query = query.to_string();
        match self {
            QueryFailure::Retrieval(source) => ExtractionError::Retrieval {
                query,
                partial,
                source,
            },
            QueryFailure::Completion(source) => ExtractionError::CompletionUnavailable {
                query,
                partial,
                source,
            },
        }
    }
}

type QueryOutcome = Result<Option<ExtractedValue>, QueryFailure>;

/// Turns parameter queries into a [`ValueMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueExtractor {
    pattern: NumericPattern,
}

impl ValueExtractor {
    pub fn new(pattern: NumericPattern) -> Self {
        Self { pattern }
    }

    /// Extract every query in order, one at a time.
    pub fn extract<R, C>(&self, queries: &[String], retriever: &R, completor: &C) -> ExtractionResult<ValueMap>
    where
        R: Retriever + ?Sized,
        C: Completor + ?Sized,
    {
        info!(queries = queries.len(), pattern = self.pattern.version(), "extracting values");

        let mut values = ValueMap::new();
        for query in queries {
            match self.extract_one(query, retriever, completor) {
                Ok(Some(value)) => values.insert(query.as_str(), value),
                Ok(None) => {}
                Err(failure) => {
                    warn!(query = %query, extracted = values.len(), "extraction aborted");
                    return Err(failure.into_error(query, values));
                }
            }
        }

        info!(extracted = values.len(), "extraction finished");
        Ok(values)
    }

    /// Extract with up to `workers` threads. Output equals [`Self::extract`].
    ///
    /// Workers claim queries in list order; after the first adapter failure no
    /// new queries are claimed.
    pub fn extract_concurrent<R, C>(
        &self,
        queries: &[String],
        retriever: &R,
        completor: &C,
        workers: usize,
    ) -> ExtractionResult<ValueMap>
    where
        R: Retriever + Sync + ?Sized,
        C: Completor + Sync + ?Sized,
    {
        let workers = workers.min(queries.len());
        if workers <= 1 {
            return self.extract(queries, retriever, completor);
        }

        info!(
            queries = queries.len(),
            workers,
            pattern = self.pattern.version(),
            "extracting values concurrently"
        );

        let cursor = &AtomicUsize::new(0);
        let abort = &AtomicBool::new(false);

        let batches: Vec<Vec<(usize, QueryOutcome)>> = std::thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                handles.push(s.spawn(move || {
                    let mut done = Vec::new();
                    while !abort.load(Ordering::SeqCst) {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(query) = queries.get(index) else {
                            break;
                        };
                        let outcome = self.extract_one(query, retriever, completor);
                        if outcome.is_err() {
                            abort.store(true, Ordering::SeqCst);
                        }
                        done.push((index, outcome));
                    }
                    done
                }));
            }

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(done) => done,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut outcomes: Vec<Option<QueryOutcome>> = queries.iter().map(|_| None).collect();
        for (index, outcome) in batches.into_iter().flatten() {
            outcomes[index] = Some(outcome);
        }

        // Claims are handed out in order, so every query before a failure
        // has an outcome.
        let mut values = ValueMap::new();
        for (query, outcome) in queries.iter().zip(outcomes) {
            match outcome {
                Some(Ok(Some(value))) => values.insert(query.as_str(), value),
                Some(Ok(None)) | None => {}
                Some(Err(failure)) => {
                    warn!(query = %query, extracted = values.len(), "extraction aborted");
                    return Err(failure.into_error(query, values));
                }
            }
        }

        info!(extracted = values.len(), "extraction finished");
        Ok(values)
    }

    fn extract_one<R, C>(&self, query: &str, retriever: &R, completor: &C) -> QueryOutcome
    where
        R: Retriever + ?Sized,
        C: Completor + ?Sized,
    {
        let segments = retriever.search(query).map_err(QueryFailure::Retrieval)?;
        if segments.is_empty() {
            debug!(query, "no passages retrieved, using empty context");
        }
        let context = join_segments(&segments);

        let prompt = make_extraction_prompt(query, &context);
        let response = completor.complete(&prompt).map_err(QueryFailure::Completion)?;

        match self.pattern.find(&response) {
            Some(number) => {
                debug!(query, value = number, "value extracted");
                Ok(Some(ExtractedValue::new(number)))
            }
            None => {
                debug!(query, "no numeric value in response");
                Ok(None)
            }
        }
    }
}

//! One-document orchestration: extract, classify, describe.

use bloodwise_core::{classify, Retriever, RiskMap, ValueMap};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::completion::Completor;
use crate::config::PipelineConfig;
use crate::extraction::{ExtractionError, ValueExtractor};
use crate::narrative::{NarrativeError, NarrativeGenerator};

/// Pipeline errors, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction stage failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Values and risks are complete; only the narrative is missing.
    #[error("Narrative stage failed: {source}")]
    Narrative {
        values: ValueMap,
        risks: RiskMap,
        source: NarrativeError,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub values: ValueMap,
    pub risks: RiskMap,
    pub narrative: String,
}

/// Runs the three stages over one document's retriever.
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    parameters: Vec<String>,
    extractor: ValueExtractor,
    narrator: NarrativeGenerator,
    workers: usize,
}

impl ReportPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            parameters: config.parameters.clone(),
            extractor: ValueExtractor::new(config.numeric_pattern),
            narrator: NarrativeGenerator::new(),
            workers: 1,
        }
    }

    /// Extract with up to `workers` threads. 1 runs sequentially.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn run<R, C>(&self, retriever: &R, completor: &C) -> PipelineResult<AnalysisOutcome>
    where
        R: Retriever + Sync + ?Sized,
        C: Completor + Sync + ?Sized,
    {
        let values = self
            .extractor
            .extract_concurrent(&self.parameters, retriever, completor, self.workers)?;

        let risks = classify(&values);
        info!(conditions = risks.len(), "risks classified");

        match self.narrator.describe(&risks, completor) {
            Ok(narrative) => Ok(AnalysisOutcome {
                values,
                risks,
                narrative,
            }),
            Err(source) => Err(PipelineError::Narrative {
                values,
                risks,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, MockCompletor};
    use bloodwise_core::LexicalRetriever;

    #[test]
    fn test_narrative_failure_keeps_results() {
        let completor = MockCompletor::new(|prompt: &str| {
            if prompt.contains("health vulnerability") {
                Err(CompletionError::Unavailable("down".into()))
            } else {
                Ok("value: 5".to_string())
            }
        });
        let retriever = LexicalRetriever::from_texts(["URIC ACID 5 mg/dL"]);
        let pipeline = ReportPipeline::new(&PipelineConfig::default());

        match pipeline.run(&retriever, &completor) {
            Err(PipelineError::Narrative { values, risks, .. }) => {
                assert_eq!(values.len(), 12);
                assert_eq!(risks.len(), 6);
            }
            other => panic!("expected narrative failure, got {:?}", other),
        }
    }

    #[test]
    fn test_workers_clamped() {
        let pipeline = ReportPipeline::new(&PipelineConfig::default()).with_workers(0);
        assert_eq!(pipeline.workers, 1);
    }
}

//! Bloodwise Core Library
//!
//! Deterministic half of the blood report analysis pipeline: value and risk
//! models, the threshold classifier, the numeric parsing contract, and the
//! segment store that backs retrieval.
//!
//! # Architecture
//!
//! ```text
//! Report text → Splitter → Segment Store (FTS5)
//!                               │
//!                        Retriever (per query)
//!                               │
//!            [bloodwise-llm: prompt → completion → numeric parse]
//!                               │
//!                           ValueMap
//!                               │
//!                   ┌───────────▼───────────┐
//!                   │      Classifier       │
//!                   │  six rule groups,     │
//!                   │  missing → 0.0        │
//!                   └───────────┬───────────┘
//!                               │
//!                            RiskMap
//!                               │
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!        [bloodwise-llm: narrative]      JSON / CSV export
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (ValueMap, RiskMap, Segment, ReportDocument)
//! - [`classifier`]: Rule groups and the total `classify` function
//! - [`numeric`]: Versioned numeric extraction pattern
//! - [`retrieval`]: Retriever trait, text splitter, fuzzy lexical retriever
//! - [`db`]: SQLite segment store with FTS5 search
//! - [`export`]: Report export

pub mod classifier;
pub mod db;
pub mod export;
pub mod models;
pub mod numeric;
pub mod retrieval;

// Re-export commonly used types
pub use classifier::{assess, classify, Assessment, Readings};
pub use db::{Database, DocumentRetriever};
pub use export::AnalysisReport;
pub use models::{
    ExtractedValue, ReportDocument, RiskLevel, RiskMap, Segment, ValueMap, DEFAULT_PARAMETERS,
};
pub use numeric::NumericPattern;
pub use retrieval::{LexicalRetriever, RetrievalError, Retriever, TextSplitter};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BloodwiseError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for BloodwiseError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(id) => BloodwiseError::NotFound(id),
            other => BloodwiseError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BloodwiseError {
    fn from(e: serde_json::Error) -> Self {
        BloodwiseError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BloodwiseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BloodwiseError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a segment store at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<BloodwiseCore>, BloodwiseError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(BloodwiseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory segment store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<BloodwiseCore>, BloodwiseError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(BloodwiseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Default parameter query list.
#[uniffi::export]
pub fn default_parameter_list() -> Vec<String> {
    models::default_parameters()
}

/// First number in a model response, using the default pattern.
#[uniffi::export]
pub fn parse_numeric_value(text: String) -> Option<f64> {
    NumericPattern::default().parse(&text)
}

/// Classify parameter values. Never fails; bad values read as zero.
#[uniffi::export]
pub fn classify_values(values: Vec<FfiParameterValue>) -> Vec<FfiRiskEntry> {
    let map: ValueMap = values.into_iter().map(FfiParameterValue::into_entry).collect();
    classify(&map).iter().map(Into::into).collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe segment store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BloodwiseCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl BloodwiseCore {
    /// Split report text into segments and store them as a new document.
    pub fn ingest_text(
        &self,
        title: Option<String>,
        text: String,
    ) -> Result<FfiReportDocument, BloodwiseError> {
        let chunks = TextSplitter::default().split(&text);
        if chunks.is_empty() {
            return Err(BloodwiseError::InvalidInput("report text is empty".into()));
        }
        let db = self.db.lock()?;
        let document = db.insert_document(title.as_deref(), &chunks)?;
        Ok(document.into())
    }

    /// Get a stored document.
    pub fn get_document(
        &self,
        document_id: String,
    ) -> Result<Option<FfiReportDocument>, BloodwiseError> {
        let db = self.db.lock()?;
        Ok(db.get_document(&document_id)?.map(Into::into))
    }

    /// List stored documents, newest first.
    pub fn list_documents(&self) -> Result<Vec<FfiReportDocument>, BloodwiseError> {
        let db = self.db.lock()?;
        Ok(db.list_documents()?.into_iter().map(Into::into).collect())
    }

    /// Search one document's segments.
    pub fn search_document(
        &self,
        document_id: String,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiSegment>, BloodwiseError> {
        let db = self.db.lock()?;
        let segments = db.search_segments(&document_id, &query, limit as usize)?;
        Ok(segments.into_iter().map(Into::into).collect())
    }

    /// Delete a document and its segments.
    pub fn delete_document(&self, document_id: String) -> Result<bool, BloodwiseError> {
        let db = self.db.lock()?;
        Ok(db.delete_document(&document_id)?)
    }

    /// Classify values and export the result as JSON, tied to a stored document.
    pub fn export_report_json(
        &self,
        document_id: String,
        values: Vec<FfiParameterValue>,
        narrative: Option<String>,
    ) -> Result<String, BloodwiseError> {
        let db = self.db.lock()?;
        let document = db
            .get_document(&document_id)?
            .ok_or_else(|| BloodwiseError::NotFound(document_id.clone()))?;

        let map: ValueMap = values.into_iter().map(FfiParameterValue::into_entry).collect();
        let risks = classify(&map);
        let mut report = AnalysisReport::new(&map, &risks).with_document(&document);
        if let Some(text) = narrative {
            report = report.with_narrative(text);
        }
        Ok(report.to_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe parameter value. The value is text so malformed input survives.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParameterValue {
    pub parameter: String,
    pub value: String,
}

impl FfiParameterValue {
    fn into_entry(self) -> (String, ExtractedValue) {
        (self.parameter, ExtractedValue::new(self.value))
    }
}

/// FFI-safe risk entry.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRiskEntry {
    pub condition: String,
    pub risk_level: String,
}

impl From<(&str, RiskLevel)> for FfiRiskEntry {
    fn from((condition, level): (&str, RiskLevel)) -> Self {
        Self {
            condition: condition.to_string(),
            risk_level: level.to_string(),
        }
    }
}

/// FFI-safe stored document.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportDocument {
    pub document_id: String,
    pub title: Option<String>,
    pub digest: String,
    pub segment_count: u32,
    pub created_at: String,
}

impl From<ReportDocument> for FfiReportDocument {
    fn from(doc: ReportDocument) -> Self {
        Self {
            document_id: doc.document_id,
            title: doc.title,
            digest: doc.digest,
            segment_count: doc.segment_count as u32,
            created_at: doc.created_at,
        }
    }
}

/// FFI-safe segment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSegment {
    pub text: String,
    pub segment_id: Option<String>,
    pub position: Option<u32>,
}

impl From<Segment> for FfiSegment {
    fn from(segment: Segment) -> Self {
        Self {
            text: segment.text,
            segment_id: segment.source.as_ref().map(|s| s.segment_id.clone()),
            position: segment.source.as_ref().map(|s| s.position as u32),
        }
    }
}

//! Analysis report export (JSON and CSV).

use serde::{Deserialize, Serialize};

use crate::models::{ReportDocument, RiskLevel, RiskMap, ValueMap};

/// Exported analysis of one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Export metadata
    pub metadata: ReportMetadata,
    /// Parameter/value table
    pub parameters: Vec<ParameterRow>,
    /// Condition/risk table
    pub risks: Vec<RiskRow>,
    /// Generated narrative, if any
    pub narrative: Option<String>,
}

/// Report export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report ID (UUID)
    pub report_id: String,
    /// Source document ID in the segment store
    pub document_id: Option<String>,
    /// SHA-256 over the source segments
    pub document_digest: Option<String>,
    /// Export timestamp
    pub generated_at: String,
}

/// Single parameter row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterRow {
    pub parameter: String,
    /// Value text as extracted
    pub value: String,
}

/// Single risk row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRow {
    pub condition: String,
    pub risk_level: RiskLevel,
}

impl AnalysisReport {
    /// Build the export tables from one analysis.
    pub fn new(values: &ValueMap, risks: &RiskMap) -> Self {
        Self {
            metadata: ReportMetadata {
                report_id: uuid::Uuid::new_v4().to_string(),
                document_id: None,
                document_digest: None,
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            parameters: values
                .iter()
                .map(|(parameter, value)| ParameterRow {
                    parameter: parameter.to_string(),
                    value: value.raw().to_string(),
                })
                .collect(),
            risks: risks
                .iter()
                .map(|(condition, risk_level)| RiskRow {
                    condition: condition.to_string(),
                    risk_level,
                })
                .collect(),
            narrative: None,
        }
    }

    /// Attach source document identity.
    pub fn with_document(mut self, document: &ReportDocument) -> Self {
        self.metadata.document_id = Some(document.document_id.clone());
        self.metadata.document_digest = Some(document.digest.clone());
        self
    }

    /// Attach a digest when the segments were never stored.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.metadata.document_digest = Some(digest.into());
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV: the parameter table, a blank line, then the risk table.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("report_id,parameter,value\n");
        for row in &self.parameters {
            csv.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&self.metadata.report_id),
                escape_csv(&row.parameter),
                escape_csv(&row.value),
            ));
        }

        csv.push('\n');
        csv.push_str("report_id,condition,risk_level\n");
        for row in &self.risks {
            csv.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&self.metadata.report_id),
                escape_csv(&row.condition),
                row.risk_level,
            ));
        }

        csv
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

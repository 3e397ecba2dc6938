//! Deterministic risk classifier.
//!
//! Pipeline position: Value Extraction → **Classification** → Narrative
//!
//! Classification is total: any [`ValueMap`], including an empty one, yields a
//! complete [`RiskMap`] with one entry per rule group. Missing and malformed
//! values both read as `0.0`.
//!
//! NOTE: treating an unknown value as zero makes several groups report `High`
//! on missing data (B12 deficiency, hypothyroidism, immune deficiency). This is
//! kept for parity with existing reports and is pending product confirmation.

mod rules;

pub use rules::*;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    RiskMap, ValueMap, BLOOD_UREA_NITROGEN, CREATININE, NEUTROPHILS, PLATELET_COUNT, RBC_COUNT,
    THYROXINE, TOTAL_CHOLESTEROL, URIC_ACID, VITAMIN_B12,
};

/// Numeric inputs read by the rule groups.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Readings {
    pub vitamin_b12: f64,
    pub rbc_count: f64,
    pub platelet_count: f64,
    pub thyroxine: f64,
    pub creatinine: f64,
    pub bun: f64,
    pub uric_acid: f64,
    pub neutrophils: f64,
    pub total_cholesterol: f64,
}

impl Readings {
    /// Read every classifier input from a value map, defaulting to `0.0`.
    pub fn from_values(values: &ValueMap) -> Self {
        Self {
            vitamin_b12: reading(values, VITAMIN_B12),
            rbc_count: reading(values, RBC_COUNT),
            platelet_count: reading(values, PLATELET_COUNT),
            thyroxine: reading(values, THYROXINE),
            creatinine: reading(values, CREATININE),
            bun: reading(values, BLOOD_UREA_NITROGEN),
            uric_acid: reading(values, URIC_ACID),
            neutrophils: reading(values, NEUTROPHILS),
            total_cholesterol: reading(values, TOTAL_CHOLESTEROL),
        }
    }
}

/// Read one parameter. Absent and malformed values become `0.0`.
fn reading(values: &ValueMap, parameter: &str) -> f64 {
    match values.lookup(parameter) {
        None => {
            debug!(parameter, "parameter missing, reading as 0.0");
            0.0
        }
        Some(value) => match value.as_f64() {
            Some(v) => v,
            None => {
                warn!(parameter, raw = value.raw(), "malformed parameter value, reading as 0.0");
                0.0
            }
        },
    }
}

/// Tagged result of every rule group for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub anemia: AnemiaOutcome,
    pub thyroid: ThyroidOutcome,
    pub kidney: KidneyOutcome,
    pub gout: GoutOutcome,
    pub immune: ImmuneOutcome,
    pub cardiovascular: CardiovascularOutcome,
}

impl Assessment {
    /// Evaluate all rule groups. Groups never read each other's inputs.
    pub fn evaluate(readings: &Readings) -> Self {
        Self {
            anemia: anemia(
                readings.vitamin_b12,
                readings.rbc_count,
                readings.platelet_count,
            ),
            thyroid: thyroid(readings.thyroxine),
            kidney: kidney(readings.creatinine, readings.bun),
            gout: gout(readings.uric_acid),
            immune: immune(readings.neutrophils),
            cardiovascular: cardiovascular(readings.total_cholesterol),
        }
    }

    /// Flatten into condition-name keys, in rule-group order.
    pub fn into_risk_map(self) -> RiskMap {
        let mut risks = RiskMap::default();
        risks.push(ANEMIA_CONDITION, self.anemia.0);
        risks.push(self.thyroid.condition(), self.thyroid.level());
        risks.push(CKD_CONDITION, self.kidney.0);
        risks.push(GOUT_CONDITION, self.gout.0);
        risks.push(self.immune.condition(), self.immune.level());
        risks.push(CARDIOVASCULAR_CONDITION, self.cardiovascular.0);
        risks
    }
}

/// Assess a value map without flattening.
pub fn assess(values: &ValueMap) -> Assessment {
    Assessment::evaluate(&Readings::from_values(values))
}

/// Classify a value map into condition risk levels.
pub fn classify(values: &ValueMap) -> RiskMap {
    let risks = assess(values).into_risk_map();
    debug!(parameters = values.len(), conditions = risks.len(), "classified report");
    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedValue, RiskLevel};

    fn values(pairs: &[(&str, &str)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ExtractedValue::new(*v)))
            .collect()
    }

    #[test]
    fn test_empty_map_defaults() {
        let risks = classify(&ValueMap::new());

        assert_eq!(risks.len(), 6);
        assert_eq!(risks.get(ANEMIA_CONDITION), Some(RiskLevel::High));
        assert_eq!(risks.get(HYPOTHYROIDISM_CONDITION), Some(RiskLevel::High));
        assert_eq!(risks.get(CKD_CONDITION), Some(RiskLevel::Low));
        assert_eq!(risks.get(GOUT_CONDITION), Some(RiskLevel::Low));
        assert_eq!(risks.get(IMMUNE_DEFICIENCY_CONDITION), Some(RiskLevel::High));
        assert_eq!(risks.get(CARDIOVASCULAR_CONDITION), Some(RiskLevel::Low));
    }

    #[test]
    fn test_malformed_reads_as_zero() {
        let malformed = values(&[(THYROXINE, "pending"), (URIC_ACID, "7.5")]);
        let missing = values(&[(URIC_ACID, "7.5")]);

        assert_eq!(classify(&malformed), classify(&missing));
        assert_eq!(classify(&malformed).get(GOUT_CONDITION), Some(RiskLevel::High));
    }

    #[test]
    fn test_healthy_report() {
        let risks = classify(&values(&[
            (VITAMIN_B12, "450"),
            (RBC_COUNT, "4.9"),
            (PLATELET_COUNT, "250000"),
            (THYROXINE, "7.8"),
            (CREATININE, "0.9"),
            (BLOOD_UREA_NITROGEN, "14"),
            (URIC_ACID, "5.2"),
            (NEUTROPHILS, "4200"),
            (TOTAL_CHOLESTEROL, "180"),
        ]));

        assert_eq!(
            risks.to_lines(),
            "Vitamin B12 Deficiency and Anemia: Low\n\
             Thyroid Dysfunction: Low\n\
             Chronic Kidney Disease (CKD): Low\n\
             Gout: Low\n\
             Infection/Immune Status: Normal\n\
             Cardiovascular Disease: Low"
        );
    }

    #[test]
    fn test_case_insensitive_parameter_names() {
        let risks = classify(&values(&[("Vitamin B12", "450"), ("rbc count", "5.0"), ("Platelet Count", "200000")]));
        assert_eq!(risks.get(ANEMIA_CONDITION), Some(RiskLevel::Low));
    }
}

//! Threshold rule groups.
//!
//! Each group picks exactly one outcome; the first matching branch wins.
//! Outcomes stay tagged until [`super::Assessment::into_risk_map`] flattens
//! them into condition names.

use serde::{Deserialize, Serialize};

use crate::models::RiskLevel;

pub const ANEMIA_CONDITION: &str = "Vitamin B12 Deficiency and Anemia";
pub const HYPOTHYROIDISM_CONDITION: &str = "Hypothyroidism";
pub const HYPERTHYROIDISM_CONDITION: &str = "Hyperthyroidism";
pub const THYROID_DYSFUNCTION_CONDITION: &str = "Thyroid Dysfunction";
pub const CKD_CONDITION: &str = "Chronic Kidney Disease (CKD)";
pub const GOUT_CONDITION: &str = "Gout";
pub const INFECTION_CONDITION: &str = "Infection";
pub const IMMUNE_DEFICIENCY_CONDITION: &str = "Immune Deficiency";
pub const IMMUNE_STATUS_CONDITION: &str = "Infection/Immune Status";
pub const CARDIOVASCULAR_CONDITION: &str = "Cardiovascular Disease";

/// Vitamin B12 below this is deficient (pg/mL).
const B12_DEFICIENT_BELOW: f64 = 200.0;
/// RBC count below this is low (million/µL).
const RBC_LOW_BELOW: f64 = 4.2;
/// Platelet count at or above this is adequate (/µL).
const PLATELET_ADEQUATE_FROM: f64 = 150_000.0;
/// Thyroxine range (µg/dL).
const THYROXINE_LOW_BELOW: f64 = 4.5;
const THYROXINE_HIGH_ABOVE: f64 = 11.2;
/// Creatinine above this is elevated (mg/dL).
const CREATININE_HIGH_ABOVE: f64 = 1.2;
/// BUN above this is elevated (mg/dL).
const BUN_HIGH_ABOVE: f64 = 20.0;
/// Uric acid above this is elevated (mg/dL).
const URIC_ACID_HIGH_ABOVE: f64 = 6.8;
/// Neutrophil range (/µL).
const NEUTROPHILS_HIGH_ABOVE: f64 = 8000.0;
const NEUTROPHILS_LOW_BELOW: f64 = 1500.0;
/// Total cholesterol bands (mg/dL).
const CHOLESTEROL_DESIRABLE_MAX: f64 = 200.0;
const CHOLESTEROL_HIGH_ABOVE: f64 = 240.0;

/// Vitamin B12 deficiency and anemia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnemiaOutcome(pub RiskLevel);

pub fn anemia(vitamin_b12: f64, rbc_count: f64, platelet_count: f64) -> AnemiaOutcome {
    if vitamin_b12 < B12_DEFICIENT_BELOW && rbc_count < RBC_LOW_BELOW {
        AnemiaOutcome(RiskLevel::High)
    } else if vitamin_b12 >= B12_DEFICIENT_BELOW
        && rbc_count >= RBC_LOW_BELOW
        && platelet_count >= PLATELET_ADEQUATE_FROM
    {
        AnemiaOutcome(RiskLevel::Low)
    } else {
        AnemiaOutcome(RiskLevel::Moderate)
    }
}

/// Thyroid status. The three variants are mutually exclusive condition names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThyroidOutcome {
    Hypothyroidism,
    Hyperthyroidism,
    Dysfunction,
}

impl ThyroidOutcome {
    pub fn condition(&self) -> &'static str {
        match self {
            ThyroidOutcome::Hypothyroidism => HYPOTHYROIDISM_CONDITION,
            ThyroidOutcome::Hyperthyroidism => HYPERTHYROIDISM_CONDITION,
            ThyroidOutcome::Dysfunction => THYROID_DYSFUNCTION_CONDITION,
        }
    }

    pub fn level(&self) -> RiskLevel {
        match self {
            ThyroidOutcome::Hypothyroidism | ThyroidOutcome::Hyperthyroidism => RiskLevel::High,
            ThyroidOutcome::Dysfunction => RiskLevel::Low,
        }
    }
}

pub fn thyroid(thyroxine: f64) -> ThyroidOutcome {
    if thyroxine < THYROXINE_LOW_BELOW {
        ThyroidOutcome::Hypothyroidism
    } else if thyroxine > THYROXINE_HIGH_ABOVE {
        ThyroidOutcome::Hyperthyroidism
    } else {
        ThyroidOutcome::Dysfunction
    }
}

/// Chronic kidney disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KidneyOutcome(pub RiskLevel);

pub fn kidney(creatinine: f64, bun: f64) -> KidneyOutcome {
    if creatinine > CREATININE_HIGH_ABOVE || bun > BUN_HIGH_ABOVE {
        KidneyOutcome(RiskLevel::High)
    } else {
        KidneyOutcome(RiskLevel::Low)
    }
}

/// Gout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoutOutcome(pub RiskLevel);

pub fn gout(uric_acid: f64) -> GoutOutcome {
    if uric_acid > URIC_ACID_HIGH_ABOVE {
        GoutOutcome(RiskLevel::High)
    } else {
        GoutOutcome(RiskLevel::Low)
    }
}

/// Immune status from the neutrophil count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImmuneOutcome {
    Infection,
    ImmuneDeficiency,
    Normal,
}

impl ImmuneOutcome {
    pub fn condition(&self) -> &'static str {
        match self {
            ImmuneOutcome::Infection => INFECTION_CONDITION,
            ImmuneOutcome::ImmuneDeficiency => IMMUNE_DEFICIENCY_CONDITION,
            ImmuneOutcome::Normal => IMMUNE_STATUS_CONDITION,
        }
    }

    pub fn level(&self) -> RiskLevel {
        match self {
            ImmuneOutcome::Infection | ImmuneOutcome::ImmuneDeficiency => RiskLevel::High,
            ImmuneOutcome::Normal => RiskLevel::Normal,
        }
    }
}

pub fn immune(neutrophils: f64) -> ImmuneOutcome {
    if neutrophils > NEUTROPHILS_HIGH_ABOVE {
        ImmuneOutcome::Infection
    } else if neutrophils < NEUTROPHILS_LOW_BELOW {
        ImmuneOutcome::ImmuneDeficiency
    } else {
        ImmuneOutcome::Normal
    }
}

/// Cardiovascular disease from total cholesterol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardiovascularOutcome(pub RiskLevel);

pub fn cardiovascular(total_cholesterol: f64) -> CardiovascularOutcome {
    if total_cholesterol > CHOLESTEROL_HIGH_ABOVE {
        CardiovascularOutcome(RiskLevel::High)
    } else if total_cholesterol <= CHOLESTEROL_DESIRABLE_MAX {
        CardiovascularOutcome(RiskLevel::Low)
    } else {
        CardiovascularOutcome(RiskLevel::Moderate)
    }
}

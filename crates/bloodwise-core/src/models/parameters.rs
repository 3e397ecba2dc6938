//! Canonical clinical parameter names.
//!
//! Parameters are plain strings so the query list stays configuration. The
//! constants below are the names the classifier reads.

pub const VITAMIN_B12: &str = "vitamin b12";
pub const SODIUM: &str = "SODIUM";
pub const RBC_COUNT: &str = "RBC COUNT";
pub const PLATELET_COUNT: &str = "PLATELET COUNT";
pub const CALCIUM: &str = "CALCIUM";
pub const CHLORIDE: &str = "CHLORIDE";
pub const URIC_ACID: &str = "URIC ACID";
pub const CREATININE: &str = "CREATININE";
pub const BLOOD_UREA_NITROGEN: &str = "BLOOD UREA NITROGEN";
pub const THYROXINE: &str = "THYROXINE";
pub const TOTAL_CHOLESTEROL: &str = "TOTAL CHOLESTEROL";
pub const NEUTROPHILS: &str = "NEUTROPHILS";

/// Default extraction query list, in report display order.
pub const DEFAULT_PARAMETERS: &[&str] = &[
    VITAMIN_B12,
    SODIUM,
    RBC_COUNT,
    PLATELET_COUNT,
    CALCIUM,
    CHLORIDE,
    URIC_ACID,
    CREATININE,
    BLOOD_UREA_NITROGEN,
    THYROXINE,
    TOTAL_CHOLESTEROL,
    NEUTROPHILS,
];

/// Owned copy of [`DEFAULT_PARAMETERS`].
pub fn default_parameters() -> Vec<String> {
    DEFAULT_PARAMETERS.iter().map(|p| p.to_string()).collect()
}

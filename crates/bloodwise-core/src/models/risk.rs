//! Risk classification results.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Severity label for a condition. Each rule group uses its own subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Normal,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Normal => "Normal",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition name → risk level for one report.
///
/// Entries appear in rule-group order. A map is built fresh per report and never
/// merged with another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskMap {
    entries: Vec<(String, RiskLevel)>,
}

impl RiskMap {
    pub(crate) fn push(&mut self, condition: impl Into<String>, level: RiskLevel) {
        self.entries.push((condition.into(), level));
    }

    /// Risk level for a condition, if that condition was produced.
    pub fn get(&self, condition: &str) -> Option<RiskLevel> {
        self.entries
            .iter()
            .find(|(name, _)| name == condition)
            .map(|(_, level)| *level)
    }

    pub fn contains(&self, condition: &str) -> bool {
        self.get(condition).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in rule-group order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RiskLevel)> {
        self.entries.iter().map(|(name, level)| (name.as_str(), *level))
    }

    pub fn conditions(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// One `condition: level` line per entry.
    pub fn to_lines(&self) -> String {
        self.entries
            .iter()
            .map(|(name, level)| format!("{}: {}", name, level))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for RiskMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, level) in &self.entries {
            map.serialize_entry(name, level)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RiskMap {
        let mut risks = RiskMap::default();
        risks.push("Gout", RiskLevel::Low);
        risks.push("Chronic Kidney Disease (CKD)", RiskLevel::High);
        risks
    }

    #[test]
    fn test_to_lines() {
        assert_eq!(
            sample().to_lines(),
            "Gout: Low\nChronic Kidney Disease (CKD): High"
        );
    }

    #[test]
    fn test_serialize_in_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"Gout":"Low","Chronic Kidney Disease (CKD)":"High"}"#);
    }

    #[test]
    fn test_get() {
        let risks = sample();
        assert_eq!(risks.get("Gout"), Some(RiskLevel::Low));
        assert_eq!(risks.get("Hyperthyroidism"), None);
    }
}

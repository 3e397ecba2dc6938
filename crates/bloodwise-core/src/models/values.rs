//! Extracted parameter values.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value extracted for one parameter.
///
/// Holds the matched text as-is. No unit normalization is applied; the magnitude
/// is trusted exactly as the report (or the model) stated it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    raw: String,
}

impl ExtractedValue {
    /// Wrap matched text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build from an already-known number.
    pub fn from_number(value: f64) -> Self {
        Self {
            raw: value.to_string(),
        }
    }

    /// The text as matched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Numeric reading, `None` when the text is not a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        self.raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ExtractedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_f64() {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str(&self.raw),
        }
    }
}

/// Accepts a JSON number, a string, or anything else as its JSON text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for ExtractedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Number(v) => ExtractedValue::from_number(v),
            RawValue::Text(s) => ExtractedValue::new(s),
            RawValue::Other(v) => ExtractedValue::new(v.to_string()),
        })
    }
}

/// Parameter name → extracted value, in query-list order.
///
/// Parameters that could not be resolved are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(String, ExtractedValue)>,
}

impl ValueMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Re-inserting a parameter replaces the value in place.
    pub fn insert(&mut self, parameter: impl Into<String>, value: ExtractedValue) {
        let parameter = parameter.into();
        match self.entries.iter_mut().find(|(name, _)| *name == parameter) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((parameter, value)),
        }
    }

    /// Exact lookup.
    pub fn get(&self, parameter: &str) -> Option<&ExtractedValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, value)| value)
    }

    /// Lookup falling back to a case-insensitive, whitespace-trimmed match.
    pub fn lookup(&self, parameter: &str) -> Option<&ExtractedValue> {
        self.get(parameter).or_else(|| {
            let wanted = parameter.trim();
            self.entries
                .iter()
                .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value)
        })
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.get(parameter).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractedValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Parameter names in insertion order.
    pub fn parameters(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, ExtractedValue)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, ExtractedValue)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (parameter, value) in iter {
            map.insert(parameter, value);
        }
        map
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ValueMapVisitor;

impl<'de> Visitor<'de> for ValueMapVisitor {
    type Value = ValueMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of parameter names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ValueMap, A::Error> {
        let mut map = ValueMap::new();
        while let Some((name, value)) = access.next_entry::<String, ExtractedValue>()? {
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for ValueMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ValueMapVisitor)
    }
}

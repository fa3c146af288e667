//! Single-row named-column table handed to the preprocessor

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// One cell of the input table
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Floating point column (subject scores)
    Float(f64),
    /// Integer column (0/1 flags)
    Int(i64),
    /// Label column (categorical selections)
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the cell, `None` for labels
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Text(_) => None,
        }
    }

    /// Label view of the cell, `None` for numbers
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the column dtype, as reported in mismatch errors
    pub fn dtype(&self) -> &'static str {
        match self {
            FeatureValue::Float(_) => "float64",
            FeatureValue::Int(_) => "int64",
            FeatureValue::Text(_) => "object",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Float(v) => serializer.serialize_f64(*v),
            FeatureValue::Int(v) => serializer.serialize_i64(*v),
            FeatureValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A single-row table. Columns are looked up by name, never by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureFrame {
    /// Build a frame from ordered `(name, value)` pairs
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, FeatureValue)>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Copy of this frame with one column removed
    pub fn without(&self, name: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|(n, _)| n != name)
                .cloned()
                .collect(),
        }
    }

    /// Copy of this frame with one column replaced (or appended)
    pub fn with(&self, name: &str, value: FeatureValue) -> Self {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => columns.push((name.to_string(), value)),
        }
        Self { columns }
    }
}

impl Serialize for FeatureFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

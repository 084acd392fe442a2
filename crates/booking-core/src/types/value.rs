//! Raw feature values as supplied by a presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single raw field of a booking record.
///
/// Mirrors the JSON scalar types a form or API can submit. Arrays and
/// objects are kept as [`FeatureValue::Other`] so that extra fields never
/// stop a record from parsing; they are rejected only if a declared feature
/// holds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Boolean flag (`true` counts as 1 for numeric features)
    Bool(bool),
    /// Integer or real number
    Number(f64),
    /// String label
    Text(String),
    /// Explicit null
    Null,
    /// Array or object
    Other(serde_json::Value),
}

impl FeatureValue {
    /// Numeric view of the value.
    ///
    /// Strings are never coerced, even when they look numeric.
    pub fn as_number(&self, feature: &str) -> Result<f64> {
        match self {
            FeatureValue::Number(n) if n.is_finite() => Ok(*n),
            FeatureValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(Error::type_conversion(feature, "number", other)),
        }
    }

    /// Label view of the value for categorical features
    pub fn as_label(&self, feature: &str) -> Result<&str> {
        match self {
            FeatureValue::Text(s) => Ok(s),
            other => Err(Error::type_conversion(feature, "string", other)),
        }
    }

    /// Short name of the value's kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Bool(_) => "bool",
            FeatureValue::Number(_) => "number",
            FeatureValue::Text(_) => "string",
            FeatureValue::Null => "null",
            FeatureValue::Other(serde_json::Value::Array(_)) => "array",
            FeatureValue::Other(_) => "object",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(b) => write!(f, "{b}"),
            FeatureValue::Number(n) => write!(f, "{n}"),
            FeatureValue::Text(s) => write!(f, "{s:?}"),
            FeatureValue::Null => write!(f, "null"),
            FeatureValue::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Number(value as f64)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Bool(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

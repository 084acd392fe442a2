//! Booking record: the raw, named-field input to the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FeatureValue;
use crate::error::{Error, Result};

/// One prediction request keyed by feature name.
///
/// Unrecognised fields are kept; the pipeline only reads the features its
/// schema declares.
///
/// # Example
///
/// ```rust
/// use booking_core::types::BookingRecord;
///
/// let record = BookingRecord::new()
///     .with("lead_time", 3)
///     .with("type_of_meal_plan", "Meal Plan 2");
/// assert_eq!(record.number("lead_time").unwrap(), 3.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl BookingRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FeatureValue>,
    ) -> Option<FeatureValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field
    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.fields.remove(name)
    }

    /// Raw field lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    /// Check whether a field is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Required field lookup
    pub fn require(&self, name: &str) -> Result<&FeatureValue> {
        self.get(name)
            .ok_or_else(|| Error::MissingFeature(name.to_string()))
    }

    /// Required numeric field
    pub fn number(&self, name: &str) -> Result<f64> {
        self.require(name)?.as_number(name)
    }

    /// Required categorical field
    pub fn label(&self, name: &str) -> Result<&str> {
        self.require(name)?.as_label(name)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a record from a JSON object
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, FeatureValue)> for BookingRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

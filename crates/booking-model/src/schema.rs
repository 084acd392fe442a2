//! Feature schema: which inputs are categorical, numerical or passthrough, and
//! the column order the classifier was trained on.

use std::collections::HashSet;

use booking_core::constants::{
    CATEGORICAL_FEATURES, DATASET_COLUMN_ORDER, NUMERICAL_FEATURES, PASSTHROUGH_FEATURES,
};
use booking_core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a classifier column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Index into the categorical features
    Categorical(usize),
    /// Index into the numerical features
    Numerical(usize),
    /// Index into the passthrough features
    Passthrough(usize),
}

/// Serialized form of a [`FeatureSchema`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSchema {
    categorical: Vec<String>,
    numerical: Vec<String>,
    #[serde(default)]
    passthrough: Vec<String>,
    column_order: Vec<String>,
}

/// Validated feature schema.
///
/// The column layout is resolved once at construction, so every record is
/// assembled in exactly the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema", into = "RawSchema")]
pub struct FeatureSchema {
    categorical: Vec<String>,
    numerical: Vec<String>,
    passthrough: Vec<String>,
    column_order: Vec<String>,
    layout: Vec<ColumnSource>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::hotel()
    }
}

impl FeatureSchema {
    /// Create a schema, validating that `column_order` is a permutation of
    /// all declared features
    pub fn new(
        categorical: Vec<String>,
        numerical: Vec<String>,
        passthrough: Vec<String>,
        column_order: Vec<String>,
    ) -> Result<Self> {
        let mut declared = HashSet::new();
        for name in categorical.iter().chain(&numerical).chain(&passthrough) {
            if !declared.insert(name.as_str()) {
                return Err(Error::InvalidArtifact(format!(
                    "feature '{name}' declared more than once"
                )));
            }
        }

        let mut layout = Vec::with_capacity(column_order.len());
        let mut seen = HashSet::new();
        for name in &column_order {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidArtifact(format!(
                    "column '{name}' appears more than once in column order"
                )));
            }
            let source = position(&categorical, name)
                .map(ColumnSource::Categorical)
                .or_else(|| position(&numerical, name).map(ColumnSource::Numerical))
                .or_else(|| position(&passthrough, name).map(ColumnSource::Passthrough))
                .ok_or_else(|| {
                    Error::InvalidArtifact(format!("column '{name}' is not a declared feature"))
                })?;
            layout.push(source);
        }

        if let Some(missing) = categorical
            .iter()
            .chain(&numerical)
            .chain(&passthrough)
            .find(|name| !seen.contains(name.as_str()))
        {
            return Err(Error::InvalidArtifact(format!(
                "feature '{missing}' is missing from column order"
            )));
        }

        Ok(Self {
            categorical,
            numerical,
            passthrough,
            column_order,
            layout,
        })
    }

    /// Hotel schema with categorical columns first, then numerical columns
    #[must_use]
    pub fn hotel() -> Self {
        let categorical = owned(&CATEGORICAL_FEATURES);
        let numerical = owned(&NUMERICAL_FEATURES);
        let column_order = categorical.iter().chain(&numerical).cloned().collect();
        let layout = (0..categorical.len())
            .map(ColumnSource::Categorical)
            .chain((0..numerical.len()).map(ColumnSource::Numerical))
            .collect();

        Self {
            categorical,
            numerical,
            passthrough: Vec::new(),
            column_order,
            layout,
        }
    }

    /// Hotel schema in the raw dataset's column order, including passthrough fields
    pub fn hotel_dataset() -> Result<Self> {
        Self::new(
            owned(&CATEGORICAL_FEATURES),
            owned(&NUMERICAL_FEATURES),
            owned(&PASSTHROUGH_FEATURES),
            owned(&DATASET_COLUMN_ORDER),
        )
    }

    /// Categorical features in encoding order
    #[must_use]
    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// Numerical features in scaler order
    #[must_use]
    pub fn numerical(&self) -> &[String] {
        &self.numerical
    }

    /// Passthrough features
    #[must_use]
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Classifier column order
    #[must_use]
    pub fn column_order(&self) -> &[String] {
        &self.column_order
    }

    /// Resolved source of each classifier column
    #[must_use]
    pub fn layout(&self) -> &[ColumnSource] {
        &self.layout
    }

    /// Width of the assembled feature vector
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.column_order.len()
    }

    /// Position of a feature in the assembled vector
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        position(&self.column_order, name)
    }
}

impl TryFrom<RawSchema> for FeatureSchema {
    type Error = Error;

    fn try_from(raw: RawSchema) -> Result<Self> {
        Self::new(raw.categorical, raw.numerical, raw.passthrough, raw.column_order)
    }
}

impl From<FeatureSchema> for RawSchema {
    fn from(schema: FeatureSchema) -> Self {
        Self {
            categorical: schema.categorical,
            numerical: schema.numerical,
            passthrough: schema.passthrough,
            column_order: schema.column_order,
        }
    }
}

fn position(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n == name)
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

//! Feature preprocessing: booking record to classifier input.

use booking_core::error::{Error, Result};
use booking_core::traits::Scaler;
use booking_core::types::BookingRecord;
use ndarray::Array1;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::encoding::EncoderMap;
use crate::schema::{ColumnSource, FeatureSchema};

/// Ordered numeric feature vector handed to the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Array1<f64>,
}

impl FeatureVector {
    /// Column names, in classifier order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in classifier order
    #[must_use]
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Values as a contiguous slice
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice().unwrap_or(&[])
    }

    /// Value of a named column
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    /// Vector width
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeatureVector", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("values", self.as_slice())?;
        state.end()
    }
}

/// Preprocessing pipeline over borrowed, read-only artifacts
pub struct Preprocessor<'a> {
    schema: &'a FeatureSchema,
    encoders: &'a EncoderMap,
    scaler: &'a dyn Scaler,
}

impl<'a> Preprocessor<'a> {
    /// Create a pipeline
    #[must_use]
    pub fn new(schema: &'a FeatureSchema, encoders: &'a EncoderMap, scaler: &'a dyn Scaler) -> Self {
        Self {
            schema,
            encoders,
            scaler,
        }
    }

    /// Integer codes for the categorical features, in schema order.
    ///
    /// The encoder is resolved before the record is read, so a missing
    /// encoder is reported even when the field is also missing.
    pub fn encode_categoricals(&self, record: &BookingRecord) -> Result<Vec<u32>> {
        self.schema
            .categorical()
            .iter()
            .map(|feature| {
                if self.encoders.get(feature).is_none() {
                    return Err(Error::MissingEncoder(feature.clone()));
                }
                let label = record.label(feature)?;
                self.encoders.encode(feature, label)
            })
            .collect()
    }

    /// Raw numerical features, in scaler order
    pub fn numerical_values(&self, record: &BookingRecord) -> Result<Vec<f64>> {
        self.schema
            .numerical()
            .iter()
            .map(|feature| record.number(feature))
            .collect()
    }

    /// Scaled numerical features, transformed as one batch
    pub fn scale_numericals(&self, record: &BookingRecord) -> Result<Vec<f64>> {
        let raw = self.numerical_values(record)?;
        let scaled = self.scaler.transform(&raw)?;
        if scaled.len() != raw.len() {
            return Err(Error::InvalidArtifact(format!(
                "scaler returned {} values for {} columns",
                scaled.len(),
                raw.len()
            )));
        }
        Ok(scaled)
    }

    /// Passthrough features, forwarded unchanged
    pub fn passthrough_values(&self, record: &BookingRecord) -> Result<Vec<f64>> {
        self.schema
            .passthrough()
            .iter()
            .map(|feature| record.number(feature))
            .collect()
    }

    /// Full pipeline: encode, scale, then assemble in classifier column order
    pub fn transform(&self, record: &BookingRecord) -> Result<FeatureVector> {
        let codes = self.encode_categoricals(record)?;
        let scaled = self.scale_numericals(record)?;
        let passthrough = self.passthrough_values(record)?;

        let values: Array1<f64> = self
            .schema
            .layout()
            .iter()
            .map(|source| match *source {
                ColumnSource::Categorical(i) => f64::from(codes[i]),
                ColumnSource::Numerical(i) => scaled[i],
                ColumnSource::Passthrough(i) => passthrough[i],
            })
            .collect();

        Ok(FeatureVector {
            columns: self.schema.column_order().to_vec(),
            values,
        })
    }
}

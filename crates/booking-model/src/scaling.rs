//! Fitted z-score scaler for the numerical features.

use booking_core::error::{Error, Result};
use booking_core::traits::Scaler;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Standard scaler: `(x - mean) / scale` per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScaler", into = "RawScaler")]
pub struct StandardScaler {
    /// Feature means
    mean: Array1<f64>,
    /// Feature scales (standard deviations)
    scale: Array1<f64>,
    /// Column names the scaler was fitted on, when recorded
    feature_names: Option<Vec<String>>,
    fitted: bool,
}

impl StandardScaler {
    /// Create with pre-computed statistics
    pub fn with_stats(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(Error::InvalidArtifact(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().any(|m| !m.is_finite()) {
            return Err(Error::InvalidArtifact(
                "scaler means must be finite".to_string(),
            ));
        }
        if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::InvalidArtifact(
                "scaler scales must be finite and non-zero".to_string(),
            ));
        }

        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
            feature_names: None,
            fitted: true,
        })
    }

    /// Record the column names the scaler was fitted on
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.mean.len() {
            return Err(Error::InvalidArtifact(format!(
                "scaler has {} columns but {} feature names",
                self.mean.len(),
                names.len()
            )));
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    /// Placeholder used when no scaler artifact is configured.
    ///
    /// Any transform fails with [`Error::NotFitted`].
    #[must_use]
    pub fn unfitted() -> Self {
        Self {
            mean: Array1::zeros(0),
            scale: Array1::zeros(0),
            feature_names: None,
            fitted: false,
        }
    }

    /// Get means
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        self.mean.as_slice().unwrap_or(&[])
    }

    /// Get scales
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        self.scale.as_slice().unwrap_or(&[])
    }

    /// Column names recorded at fit time
    #[must_use]
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Check that the recorded column names match the expected order
    pub fn check_feature_names(&self, expected: &[String]) -> Result<()> {
        match &self.feature_names {
            Some(names) if names.as_slice() != expected => Err(Error::InvalidArtifact(format!(
                "scaler was fitted on columns {names:?}, schema expects {expected:?}"
            ))),
            _ => Ok(()),
        }
    }

    /// Transform a batch of rows
    pub fn transform_batch(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if !self.fitted {
            return Err(Error::NotFitted("scaler".to_string()));
        }
        if data.ncols() != self.mean.len() {
            return Err(Error::InvalidArtifact(format!(
                "scaler expects {} columns, got {}",
                self.mean.len(),
                data.ncols()
            )));
        }

        let mean = self.mean.view().insert_axis(Axis(0));
        let scale = self.scale.view().insert_axis(Axis(0));
        Ok((&data - &mean) / &scale)
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        let view = ArrayView2::from_shape((1, row.len()), row)
            .map_err(|e| Error::InvalidArtifact(e.to_string()))?;
        Ok(self.transform_batch(view)?.into_raw_vec())
    }

    fn n_features(&self) -> Option<usize> {
        self.fitted.then_some(self.mean.len())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl TryFrom<RawScaler> for StandardScaler {
    type Error = Error;

    fn try_from(raw: RawScaler) -> Result<Self> {
        let scaler = Self::with_stats(raw.mean, raw.scale)?;
        match raw.feature_names {
            Some(names) => scaler.with_feature_names(names),
            None => Ok(scaler),
        }
    }
}

impl From<StandardScaler> for RawScaler {
    fn from(scaler: StandardScaler) -> Self {
        Self {
            mean: scaler.mean.to_vec(),
            scale: scaler.scale.to_vec(),
            feature_names: scaler.feature_names,
        }
    }
}

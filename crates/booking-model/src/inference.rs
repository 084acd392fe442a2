//! Prediction service over the loaded artifacts.

use std::sync::Arc;
use std::time::Instant;

use booking_core::error::{Error, Result};
use booking_core::types::{BookingClass, BookingRecord, ClassProbabilities};
use serde::Serialize;

use crate::artifacts::{ArtifactPaths, ArtifactStore};
use crate::preprocessing::FeatureVector;

/// Model prediction output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted class (0 = cancelled, 1 = not cancelled)
    pub predicted_class: BookingClass,
    /// Probabilities `[p_cancelled, p_not_cancelled]`
    pub probabilities: ClassProbabilities,
    /// Inference latency in nanoseconds
    #[serde(skip)]
    pub latency_ns: u64,
}

impl Prediction {
    /// Probability of the predicted class
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities.get(self.predicted_class)
    }

    /// Check if the booking is predicted to be cancelled
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.predicted_class.is_canceled()
    }

    /// One-line human readable verdict
    #[must_use]
    pub fn summary(&self) -> String {
        let pct = self.confidence() * 100.0;
        if self.is_canceled() {
            format!("High risk of cancellation ({pct:.1}% confidence)")
        } else {
            format!("Booking likely to be completed ({pct:.1}% confidence)")
        }
    }
}

/// Stateless predictor sharing one immutable [`ArtifactStore`]
#[derive(Debug, Clone)]
pub struct BookingPredictor {
    store: Arc<ArtifactStore>,
}

impl BookingPredictor {
    /// Wrap an already-loaded store
    #[must_use]
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Load the artifacts and build a predictor
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        Ok(Self::new(Arc::new(ArtifactStore::load(paths)?)))
    }

    /// Shared artifacts
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Turn a record into the classifier's input vector
    pub fn preprocess(&self, record: &BookingRecord) -> Result<FeatureVector> {
        self.store.preprocessor().transform(record)
    }

    /// Classify an already-preprocessed vector
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<Prediction> {
        self.predict_values(vector.as_slice())
    }

    /// Classify a raw ordered vector
    pub fn predict_values(&self, values: &[f64]) -> Result<Prediction> {
        let start = Instant::now();

        let probabilities = self.store.classifier().predict_proba(values)?;
        let predicted_class = probabilities.predicted_class();

        let latency_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        Ok(Prediction {
            predicted_class,
            probabilities,
            latency_ns,
        })
    }

    /// Preprocess and classify one record
    pub fn predict(&self, record: &BookingRecord) -> Result<Prediction> {
        let start = Instant::now();

        let vector = self.preprocess(record)?;
        let mut prediction = self.predict_vector(&vector).map_err(|e| match e {
            Error::PredictionFailure(msg) => Error::PredictionFailure(format!(
                "{msg} (schema produces {} columns)",
                vector.len()
            )),
            other => other,
        })?;
        prediction.latency_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        tracing::debug!(
            "Predicted {} with p={:.4} in {}ns",
            prediction.predicted_class,
            prediction.confidence(),
            prediction.latency_ns
        );
        Ok(prediction)
    }
}

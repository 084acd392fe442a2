//! Capability traits for fitted artifacts.
//!
//! Every artifact is loaded once and shared read-only, so all traits take
//! `&self` and require `Send + Sync`.

use crate::types::{BookingClass, ClassProbabilities};

/// Fitted label encoder for one categorical feature
pub trait CategoricalEncoder: Send + Sync {
    /// Integer code for a label, `None` if the label was never seen in training
    fn encode(&self, label: &str) -> Option<u32>;

    /// Label for an integer code, `None` if the code is out of range
    fn decode(&self, code: u32) -> Option<&str>;

    /// The fitted vocabulary, ordered by code
    fn classes(&self) -> &[String];
}

/// Fitted per-column affine transform over the numerical features
pub trait Scaler: Send + Sync {
    /// Transform one row of numerical features, in fitted column order
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, crate::Error>;

    /// Number of columns the scaler was fitted on, `None` when unfitted
    fn n_features(&self) -> Option<usize>;

    /// Whether this scaler carries fitted statistics
    fn is_fitted(&self) -> bool;
}

/// Trained binary classifier over an ordered feature vector
pub trait Classifier: Send + Sync {
    /// Model family name for logging
    fn name(&self) -> &str;

    /// Expected input width
    fn n_features(&self) -> usize;

    /// Probability distribution over both classes
    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, crate::Error>;

    /// Predicted class; ties resolve to the lower class index
    fn predict(&self, features: &[f64]) -> Result<BookingClass, crate::Error> {
        Ok(self.predict_proba(features)?.predicted_class())
    }
}

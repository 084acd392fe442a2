//! # booking-model
//!
//! Artifact loading, preprocessing and prediction for hotel booking outcomes.
//!
//! This crate provides:
//! - Fitted artifacts: label encoders, standard scaler, classifiers
//! - One-shot artifact loading from JSON or bincode files
//! - The preprocessing pipeline from [`BookingRecord`](booking_core::BookingRecord)
//!   to an ordered feature vector
//! - A stateless prediction service safe to share across threads
//!
//! ## Example
//!
//! ```rust,no_run
//! use booking_core::types::BookingRecord;
//! use booking_model::artifacts::ArtifactPaths;
//! use booking_model::inference::BookingPredictor;
//!
//! let predictor = BookingPredictor::load(&ArtifactPaths::default())?;
//! let record = BookingRecord::from_json_str(r#"{"lead_time": 3}"#)?;
//! let prediction = predictor.predict(&record)?;
//! println!("{}", prediction.summary());
//! # Ok::<(), booking_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

pub mod artifacts;
pub mod classifier;
pub mod encoding;
pub mod inference;
pub mod preprocessing;
pub mod scaling;
pub mod schema;

pub use artifacts::{ArtifactPaths, ArtifactStatus, ArtifactStore};
pub use classifier::{ClassifierArtifact, DecisionTree, LogisticRegression, RandomForest};
pub use encoding::{EncoderMap, LabelEncoder};
pub use inference::{BookingPredictor, Prediction};
pub use preprocessing::{FeatureVector, Preprocessor};
pub use scaling::StandardScaler;
pub use schema::FeatureSchema;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifacts::{ArtifactPaths, ArtifactStore};
    pub use crate::inference::{BookingPredictor, Prediction};
    pub use crate::preprocessing::FeatureVector;
    pub use crate::schema::FeatureSchema;
}

//! Error types for the booking prediction pipeline.

use thiserror::Error;

/// Core error type for preprocessing, prediction and artifact loading
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No fitted encoder registered for a categorical feature
    #[error("No encoder found for categorical feature '{0}'")]
    MissingEncoder(String),

    /// Categorical value outside the encoder's fitted vocabulary
    #[error("Unknown category for feature '{feature}': {value:?}")]
    UnknownCategory {
        /// Feature name
        feature: String,
        /// Offending label
        value: String,
    },

    /// Declared feature absent from the record
    #[error("Missing feature: {0}")]
    MissingFeature(String),

    /// Feature value has the wrong type
    #[error("Type conversion failed for feature '{feature}': expected {expected}, found {found}")]
    TypeConversion {
        /// Feature name
        feature: String,
        /// Expected kind of value
        expected: String,
        /// Rendering of the value that was found
        found: String,
    },

    /// A placeholder artifact was used where a fitted one is required
    #[error("Artifact not fitted: {0}")]
    NotFitted(String),

    /// Classifier rejected the assembled feature vector
    #[error("Prediction failure: {0}")]
    PredictionFailure(String),

    /// Artifact could not be read or decoded
    #[error("Failed to load {artifact} artifact: {reason}")]
    ArtifactLoad {
        /// Which artifact (model, scaler, encoders, schema)
        artifact: String,
        /// Underlying cause
        reason: String,
    },

    /// Artifact decoded but is internally inconsistent
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::TypeConversion`] from any displayable value
    pub fn type_conversion(
        feature: impl Into<String>,
        expected: impl Into<String>,
        found: impl std::fmt::Display,
    ) -> Self {
        Error::TypeConversion {
            feature: feature.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Build a [`Error::ArtifactLoad`]
    pub fn artifact_load(artifact: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::ArtifactLoad {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error was caused by the request rather than the packaged artifacts
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownCategory { .. } | Error::MissingFeature(_) | Error::TypeConversion { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingFeature("lead_time".to_string());
        assert_eq!(err.to_string(), "Missing feature: lead_time");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = Error::UnknownCategory {
            feature: "room_type_reserved".to_string(),
            value: "Room_Type 99".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("room_type_reserved"));
        assert!(msg.contains("Room_Type 99"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(Error::MissingFeature("lead_time".into()).is_input_error());
        assert!(Error::type_conversion("lead_time", "number", "\"abc\"").is_input_error());
        assert!(!Error::MissingEncoder("type_of_meal_plan".into()).is_input_error());
        assert!(!Error::PredictionFailure("width".into()).is_input_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}

//! Fitted label encoders for categorical features.

use std::collections::BTreeMap;

use booking_core::error::{Error, Result};
use booking_core::traits::CategoricalEncoder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLabelEncoder {
    classes: Vec<String>,
}

/// Label encoder with a sorted, unique vocabulary.
///
/// A label's code is its index in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelEncoder", into = "RawLabelEncoder")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create from a fitted vocabulary; classes must be strictly ascending
    pub fn from_classes<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Result<Self> {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();

        if classes.is_empty() {
            return Err(Error::InvalidArtifact(
                "label encoder has an empty vocabulary".to_string(),
            ));
        }
        if u32::try_from(classes.len()).is_err() {
            return Err(Error::InvalidArtifact(
                "label encoder vocabulary too large".to_string(),
            ));
        }
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidArtifact(format!(
                "label encoder classes must be sorted and unique: {:?} before {:?}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { classes })
    }

    /// Vocabulary size
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false for a validated encoder
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn encode(&self, label: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
            .and_then(|idx| u32::try_from(idx).ok())
    }

    fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl TryFrom<RawLabelEncoder> for LabelEncoder {
    type Error = Error;

    fn try_from(raw: RawLabelEncoder) -> Result<Self> {
        Self::from_classes(raw.classes)
    }
}

impl From<LabelEncoder> for RawLabelEncoder {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

/// Mapping from categorical feature name to its fitted encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, LabelEncoder>", into = "BTreeMap<String, LabelEncoder>")]
pub struct EncoderMap {
    encoders: BTreeMap<String, LabelEncoder>,
    fitted: bool,
}

impl EncoderMap {
    /// Create from fitted encoders
    #[must_use]
    pub fn new(encoders: BTreeMap<String, LabelEncoder>) -> Self {
        Self {
            encoders,
            fitted: true,
        }
    }

    /// Placeholder used when no encoder artifact is configured.
    ///
    /// Every lookup fails with [`Error::MissingEncoder`].
    #[must_use]
    pub fn unfitted() -> Self {
        Self {
            encoders: BTreeMap::new(),
            fitted: false,
        }
    }

    /// Whether this map was loaded from a fitted artifact
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Encoder for a feature
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&LabelEncoder> {
        self.encoders.get(feature)
    }

    /// Encode a label for a feature
    pub fn encode(&self, feature: &str, label: &str) -> Result<u32> {
        let encoder = self
            .get(feature)
            .ok_or_else(|| Error::MissingEncoder(feature.to_string()))?;
        encoder.encode(label).ok_or_else(|| Error::UnknownCategory {
            feature: feature.to_string(),
            value: label.to_string(),
        })
    }

    /// Decode a code back to its label
    pub fn decode(&self, feature: &str, code: u32) -> Result<&str> {
        let encoder = self
            .get(feature)
            .ok_or_else(|| Error::MissingEncoder(feature.to_string()))?;
        encoder.decode(code).ok_or_else(|| Error::UnknownCategory {
            feature: feature.to_string(),
            value: code.to_string(),
        })
    }

    /// Features with a registered encoder
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Number of registered encoders
    #[must_use]
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Check if no encoders are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl From<BTreeMap<String, LabelEncoder>> for EncoderMap {
    fn from(encoders: BTreeMap<String, LabelEncoder>) -> Self {
        Self::new(encoders)
    }
}

impl From<EncoderMap> for BTreeMap<String, LabelEncoder> {
    fn from(map: EncoderMap) -> Self {
        map.encoders
    }
}

impl FromIterator<(String, LabelEncoder)> for EncoderMap {
    fn from_iter<I: IntoIterator<Item = (String, LabelEncoder)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

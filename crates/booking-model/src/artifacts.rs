//! Artifact store: one-shot loading of the fitted classifier, scaler,
//! encoder map and feature schema.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use booking_core::constants::{DEFAULT_ENCODER_PATH, DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use booking_core::error::{Error, Result};
use booking_core::traits::{Classifier, Scaler};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierArtifact;
use crate::encoding::EncoderMap;
use crate::preprocessing::Preprocessor;
use crate::scaling::StandardScaler;
use crate::schema::FeatureSchema;

/// On-disk encoding of an artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// `.json`
    Json,
    /// `.bin` / `.bincode`
    Bincode,
}

impl ArtifactFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ArtifactFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("bin") || ext.eq_ignore_ascii_case("bincode") => {
                Ok(ArtifactFormat::Bincode)
            }
            _ => Err(Error::artifact_load(
                path.display().to_string(),
                "unsupported extension (expected .json, .bin or .bincode)",
            )),
        }
    }
}

/// Deserialize one artifact from disk
pub fn load_artifact<T: DeserializeOwned>(kind: &str, path: &Path) -> Result<T> {
    let format = ArtifactFormat::from_path(path)?;
    let file = File::open(path)
        .map_err(|e| Error::artifact_load(kind, format!("{}: {e}", path.display())))?;
    let reader = BufReader::new(file);

    let decoded = match format {
        ArtifactFormat::Json => serde_json::from_reader(reader).map_err(|e| e.to_string()),
        ArtifactFormat::Bincode => bincode::deserialize_from(reader).map_err(|e| e.to_string()),
    };
    decoded.map_err(|e| Error::artifact_load(kind, format!("{}: {e}", path.display())))
}

/// Serialize one artifact to disk
pub fn save_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    let format = ArtifactFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ArtifactFormat::Json => serde_json::to_writer_pretty(&mut writer, artifact)?,
        ArtifactFormat::Bincode => bincode::serialize_into(&mut writer, artifact)?,
    }
    writer.flush()?;
    Ok(())
}

/// Locations of the artifacts to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Classifier artifact
    pub model: PathBuf,
    /// Scaler artifact; a placeholder is used when absent
    pub scaler: Option<PathBuf>,
    /// Encoder map artifact; a placeholder is used when absent
    pub encoders: Option<PathBuf>,
    /// Feature schema; the default hotel schema is used when absent
    pub schema: Option<PathBuf>,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler: Some(PathBuf::from(DEFAULT_SCALER_PATH)),
            encoders: Some(PathBuf::from(DEFAULT_ENCODER_PATH)),
            schema: None,
        }
    }
}

/// Which loaded artifacts are real and which are placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    /// Scaler carries fitted statistics
    pub scaler_fitted: bool,
    /// Encoder map was loaded from an artifact
    pub encoders_fitted: bool,
}

impl ArtifactStatus {
    /// Whether every artifact is usable for prediction
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.scaler_fitted && self.encoders_fitted
    }
}

/// Immutable set of fitted artifacts, shared read-only by every prediction
pub struct ArtifactStore {
    schema: FeatureSchema,
    encoders: EncoderMap,
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl ArtifactStore {
    /// Load every artifact named in `paths`. Any failure is fatal.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let schema = match &paths.schema {
            Some(path) => load_artifact::<FeatureSchema>("schema", path)?,
            None => FeatureSchema::hotel(),
        };

        let classifier: ClassifierArtifact = load_artifact("model", &paths.model)?;
        tracing::info!(
            "Loaded {} classifier from {} ({} features)",
            classifier.name(),
            paths.model.display(),
            classifier.n_features()
        );

        let scaler = match &paths.scaler {
            Some(path) => {
                let scaler: StandardScaler = load_artifact("scaler", path)?;
                tracing::info!("Loaded scaler from {}", path.display());
                scaler
            }
            None => {
                tracing::warn!("No scaler configured, numerical features cannot be scaled");
                StandardScaler::unfitted()
            }
        };
        scaler.check_feature_names(schema.numerical())?;

        let encoders = match &paths.encoders {
            Some(path) => {
                let encoders: EncoderMap = load_artifact("encoders", path)?;
                tracing::info!("Loaded {} encoders from {}", encoders.len(), path.display());
                encoders
            }
            None => {
                tracing::warn!("No encoders configured, categorical features cannot be encoded");
                EncoderMap::unfitted()
            }
        };

        Self::from_parts(schema, encoders, scaler, classifier)
    }

    /// Assemble a store from already-loaded artifacts
    pub fn from_parts(
        schema: FeatureSchema,
        encoders: EncoderMap,
        scaler: impl Scaler + 'static,
        classifier: impl Classifier + 'static,
    ) -> Result<Self> {
        if let Some(width) = scaler.n_features() {
            if width != schema.numerical().len() {
                return Err(Error::InvalidArtifact(format!(
                    "scaler fitted on {width} columns, schema declares {} numerical features",
                    schema.numerical().len()
                )));
            }
        }

        if encoders.is_fitted() {
            for feature in schema.categorical() {
                if encoders.get(feature).is_none() {
                    tracing::warn!("No encoder for categorical feature '{}'", feature);
                }
            }
        }

        Ok(Self {
            schema,
            encoders,
            scaler: Box::new(scaler),
            classifier: Box::new(classifier),
        })
    }

    /// Feature schema
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encoder map
    #[must_use]
    pub fn encoders(&self) -> &EncoderMap {
        &self.encoders
    }

    /// Scaler
    #[must_use]
    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    /// Classifier
    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Placeholder status of the loaded artifacts
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            scaler_fitted: self.scaler.is_fitted(),
            encoders_fitted: self.encoders.is_fitted(),
        }
    }

    /// Verify the classifier accepts vectors of the schema's width
    pub fn check_integrity(&self) -> Result<()> {
        let expected = self.classifier.n_features();
        let produced = self.schema.n_columns();
        if expected != produced {
            return Err(Error::InvalidArtifact(format!(
                "classifier expects {expected} features, schema produces {produced}"
            )));
        }
        Ok(())
    }

    /// Preprocessing pipeline over this store's artifacts
    #[must_use]
    pub fn preprocessor(&self) -> Preprocessor<'_> {
        Preprocessor::new(&self.schema, &self.encoders, self.scaler.as_ref())
    }
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("columns", &self.schema.n_columns())
            .field("encoders", &self.encoders.len())
            .field("scaler_fitted", &self.scaler.is_fitted())
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

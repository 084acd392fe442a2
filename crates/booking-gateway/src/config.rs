//! Application configuration.

use booking_core::constants::{DEFAULT_ENCODER_PATH, DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use booking_core::error::Error;
use booking_model::artifacts::ArtifactPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "BOOKING_CONFIG";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Log level
    pub log_level: String,
    /// HTTP port for `serve`
    pub port: u16,
    /// Artifact locations
    pub artifacts: ArtifactConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "booking-predict".to_string(),
            log_level: "info".to_string(),
            port: 8080,
            artifacts: ArtifactConfig::default(),
        }
    }
}

/// Artifact locations.
///
/// A missing `[artifacts]` table uses [`ArtifactConfig::default`]. Inside the
/// table, an omitted optional path means no artifact of that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Trained classifier
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Fitted scaler; unset means a placeholder scaler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler_path: Option<PathBuf>,
    /// Fitted encoder map; unset means placeholder encoders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder_path: Option<PathBuf>,
    /// Feature schema; unset means the default hotel schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            scaler_path: Some(PathBuf::from(DEFAULT_SCALER_PATH)),
            encoder_path: Some(PathBuf::from(DEFAULT_ENCODER_PATH)),
            schema_path: None,
        }
    }
}

impl ArtifactConfig {
    /// Paths in the form the artifact store loads from
    #[must_use]
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            scaler: self.scaler_path.clone(),
            encoders: self.encoder_path.clone(),
            schema: self.schema_path.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Load from the file named by `BOOKING_CONFIG`, or use defaults
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_model::artifacts::save_artifact;
    use booking_model::classifier::{ClassifierArtifact, LogisticRegression};
    use booking_model::inference::BookingPredictor;

    #[test]
    fn test_defaults_point_at_models_dir() {
        let paths = AppConfig::default().artifacts.paths();
        assert_eq!(paths, ArtifactPaths::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            log_level = "debug"

            [artifacts]
            model_path = "artifacts/forest.bin"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.port, 8080);
        assert_eq!(config.artifacts.model_path, PathBuf::from("artifacts/forest.bin"));
        assert_eq!(config.artifacts.scaler_path, None);
        assert_eq!(config.artifacts.encoder_path, None);
        assert_eq!(config.artifacts.schema_path, None);
    }

    #[test]
    fn test_missing_artifacts_table_uses_models_dir() {
        let config: AppConfig = toml::from_str("port = 9100").unwrap();
        assert_eq!(config.artifacts, ArtifactConfig::default());
        assert_eq!(
            config.artifacts.scaler_path,
            Some(PathBuf::from(DEFAULT_SCALER_PATH))
        );

        let config: AppConfig = toml::from_str("[artifacts]").unwrap();
        assert_eq!(config.artifacts.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.artifacts.scaler_path, None);
    }

    #[test]
    fn test_omitted_paths_load_as_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let model = LogisticRegression::new(vec![0.0; 12], 0.0).unwrap();
        save_artifact(&model_path, &ClassifierArtifact::from(model)).unwrap();

        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[artifacts]\nmodel_path = {:?}\n", model_path.display().to_string()),
        )
        .unwrap();

        let config = AppConfig::load(&config_path).unwrap();
        let predictor = BookingPredictor::load(&config.artifacts.paths()).unwrap();
        let status = predictor.store().status();
        assert!(!status.scaler_fitted);
        assert!(!status.encoders_fitted);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.port = 9000;
        config.artifacts.schema_path = Some(PathBuf::from("models/schema.json"));
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"eighty\"").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ConfigError(msg)) if msg.contains("config.toml")
        ));
    }
}

//! Prediction API configuration

use serde::{Deserialize, Serialize};
use spamguard_classifiers::{DecisionPolicy, DeviceType, ModelConfig, ScoreTransform};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Prediction API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Model artifact and decision settings
    #[serde(default)]
    pub model: ModelSettings,
}

impl ApiConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(model) = &cli.model {
            config.model.path = PathBuf::from(model);
        }
        if let Some(threshold) = cli.threshold {
            config.model.threshold = threshold;
        }
        if let Some(device) = &cli.device {
            config.model.device = device.clone();
        }
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }

        Ok(config)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model: ModelSettings::default(),
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Directory of the model artifact
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Inference device
    #[serde(default = "default_device")]
    pub device: String,

    /// A confidence strictly above this is spam
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Raw score transform
    #[serde(default)]
    pub transform: ScoreTransform,
}

impl ModelSettings {
    /// Loader options for the classifier crate
    pub fn to_model_config(&self) -> spamguard_core::Result<ModelConfig> {
        let device: DeviceType = self.device.parse()?;
        Ok(ModelConfig::from_local(&self.path)
            .with_device(device)
            .with_policy(DecisionPolicy {
                threshold: self.threshold,
                transform: self.transform,
            }))
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            device: default_device(),
            threshold: default_threshold(),
            transform: ScoreTransform::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/text_model")
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_threshold() -> f32 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli {
            config: "/nonexistent/api.yaml".to_string(),
            ..Default::default()
        };
        let config = ApiConfig::load(&cli).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.model.path, PathBuf::from("data/text_model"));
        assert_eq!(config.model.threshold, 0.5);
        assert_eq!(config.model.transform, ScoreTransform::Sigmoid);
    }

    #[test]
    fn test_file_then_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port: 9000\nmodel:\n  path: /models/spam\n  threshold: 0.6\n  transform: identity"
        )
        .unwrap();

        let cli = Cli {
            config: file.path().to_string_lossy().to_string(),
            threshold: Some(0.8),
            ..Default::default()
        };
        let config = ApiConfig::load(&cli).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("/models/spam"));
        assert_eq!(config.model.threshold, 0.8);
        assert_eq!(config.model.transform, ScoreTransform::Identity);
    }

    #[test]
    fn test_bad_device_rejected() {
        let settings = ModelSettings {
            device: "abacus".to_string(),
            ..Default::default()
        };
        assert!(settings.to_model_config().is_err());
    }
}

//! Model loading for the Candle-based spam classifier

use async_trait::async_trait;
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use spamguard_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::classifier::{Classifier, Verdict};
use crate::model_config::{Architecture, TextModelConfig};
use crate::policy::DecisionPolicy;
use crate::text_model::EmbeddingBagModel;

/// File names expected inside a model directory
pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Options for loading a model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Directory holding config, tokenizer and weights
    pub path: PathBuf,

    /// Device to run inference on
    pub device: DeviceType,

    /// Threshold and score transform
    pub policy: DecisionPolicy,
}

impl ModelConfig {
    /// Create a new model configuration from a local directory
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            device: DeviceType::Cpu,
            policy: DecisionPolicy::default(),
        }
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    /// Set decision policy
    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceType {
    type Err = Error;

    /// Parses `cpu`, `cuda`, `cuda:N`, `metal` and `metal:N`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let (kind, index) = match s.split_once(':') {
            Some((kind, idx)) => {
                let idx = idx
                    .parse::<usize>()
                    .map_err(|_| Error::config(format!("invalid device index in '{}'", s)))?;
                (kind.to_string(), idx)
            }
            None => (s.clone(), 0),
        };

        match kind.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(Error::config(format!("unknown device '{}'", s))),
        }
    }
}

/// The loaded spam classifier.
///
/// Immutable after [`SpamModel::load`]; inference takes `&self` and can run
/// from any number of tasks at once.
pub struct SpamModel {
    name: String,
    tokenizer: Tokenizer,
    model: EmbeddingBagModel,
    device: Device,
    policy: DecisionPolicy,
    max_length: usize,
}

impl std::fmt::Debug for SpamModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpamModel")
            .field("name", &self.name)
            .field("device", &self.device)
            .field("policy", &self.policy)
            .field("max_length", &self.max_length)
            .finish()
    }
}

impl SpamModel {
    /// Load a model from configuration.
    ///
    /// Every failure (missing files, unparsable config, unsupported
    /// architecture, tensor mismatch) is reported as [`Error::ModelLoad`].
    pub fn load(config: &ModelConfig) -> Result<Self> {
        config
            .policy
            .validate()
            .map_err(|e| Error::model_load(e.to_string()))?;

        let dir = &config.path;
        if !dir.is_dir() {
            return Err(Error::model_load(format!(
                "Model directory not found: {}",
                dir.display()
            )));
        }

        let model_config = Self::read_config(&dir.join(CONFIG_FILE))?;
        let tokenizer = Self::load_tokenizer(&dir.join(TOKENIZER_FILE))?;

        let vocab = tokenizer.get_vocab_size(true);
        if vocab > model_config.vocab_size {
            return Err(Error::model_load(format!(
                "Tokenizer vocabulary ({}) exceeds embedding rows ({})",
                vocab, model_config.vocab_size
            )));
        }

        let device = Self::create_device(config.device)?;

        let weights_path = dir.join(WEIGHTS_FILE);
        if !weights_path.is_file() {
            return Err(Error::model_load(format!(
                "Weights file not found: {}",
                weights_path.display()
            )));
        }

        // SAFETY: the weights file is opened read-only and never modified
        // while the process runs.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
                .map_err(|e| Error::model_load(format!("Failed to load weights: {}", e)))?
        };

        let model = match model_config.architecture {
            Architecture::EmbeddingBag => EmbeddingBagModel::load(vb, &model_config)
                .map_err(|e| Error::model_load(format!("Incompatible weights: {}", e)))?,
        };

        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("spam-model")
            .to_string();

        info!(
            model = %name,
            vocab_size = model_config.vocab_size,
            hidden_size = model_config.hidden_size,
            threshold = config.policy.threshold,
            "Model loaded from {}",
            dir.display()
        );

        Ok(Self {
            name,
            tokenizer,
            model,
            device,
            policy: config.policy,
            max_length: model_config.max_length,
        })
    }

    fn read_config(path: &Path) -> Result<TextModelConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::model_load(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::model_load(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
        Tokenizer::from_file(path).map_err(|e| {
            Error::model_load(format!("Failed to load tokenizer {}: {}", path.display(), e))
        })
    }

    /// Create Candle device from device type
    fn create_device(device_type: DeviceType) -> Result<Device> {
        match device_type {
            DeviceType::Cpu => Ok(Device::Cpu),
            DeviceType::Cuda(idx) => Device::new_cuda(idx)
                .map_err(|e| Error::model_load(format!("Failed to create CUDA device: {}", e))),
            DeviceType::Metal(idx) => Device::new_metal(idx)
                .map_err(|e| Error::model_load(format!("Failed to create Metal device: {}", e))),
        }
    }

    /// Run one prediction synchronously
    pub fn predict(&self, text: &str) -> Result<Verdict> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| Error::prediction(format!("Tokenization failed: {}", e)))?;

        let ids = encoding.get_ids();
        let ids = &ids[..ids.len().min(self.max_length)];

        let raw = self
            .model
            .forward(ids, &self.device)
            .map_err(|e| Error::prediction(format!("Model forward pass failed: {}", e)))?;

        let verdict = self.policy.decide(raw, start.elapsed())?;
        debug!(
            tokens = ids.len(),
            raw,
            confidence = verdict.confidence,
            "Prediction complete"
        );
        Ok(verdict)
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }
}

#[async_trait]
impl Classifier for SpamModel {
    async fn classify(&self, text: &str) -> Result<Verdict> {
        self.predict(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_local() {
        let config = ModelConfig::from_local("/path/to/model")
            .with_device(DeviceType::Cpu)
            .with_policy(DecisionPolicy {
                threshold: 0.7,
                ..Default::default()
            });

        assert_eq!(config.path, PathBuf::from("/path/to/model"));
        assert_eq!(config.policy.threshold, 0.7);
    }

    #[test]
    fn test_parse_device() {
        assert_eq!("cpu".parse::<DeviceType>().unwrap(), DeviceType::Cpu);
        assert_eq!("CUDA:1".parse::<DeviceType>().unwrap(), DeviceType::Cuda(1));
        assert_eq!("mps".parse::<DeviceType>().unwrap(), DeviceType::Metal(0));
        assert!("tpu".parse::<DeviceType>().is_err());
        assert!("cuda:x".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_missing_directory_is_model_load_error() {
        let err = SpamModel::load(&ModelConfig::from_local("/nonexistent/spam-model")).unwrap_err();
        assert_eq!(err.kind(), "model_load");
    }
}

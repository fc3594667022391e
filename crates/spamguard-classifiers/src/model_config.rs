//! On-disk model description (`config.json` inside the model directory)

use serde::{Deserialize, Serialize};

/// Network family of the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Architecture {
    /// Token embeddings, mean pooled, followed by a single-logit linear head
    EmbeddingBag,
}

/// Shape information needed to rebuild the network around the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextModelConfig {
    pub architecture: Architecture,

    /// Rows of the embedding table
    pub vocab_size: usize,

    /// Embedding width
    pub hidden_size: usize,

    /// Inputs are truncated to this many tokens
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_max_length() -> usize {
    256
}

//! Embedding-bag text network

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Embedding, Linear, VarBuilder};

use crate::model_config::TextModelConfig;

/// Token embedding, mean pooling and a linear head emitting one logit.
///
/// Expects `embedding.weight [vocab, hidden]`, `classifier.weight [1, hidden]`
/// and `classifier.bias [1]` in the weights file.
pub struct EmbeddingBagModel {
    embedding: Embedding,
    head: Linear,
    hidden_size: usize,
}

impl EmbeddingBagModel {
    pub fn load(vb: VarBuilder, config: &TextModelConfig) -> candle_core::Result<Self> {
        let embedding =
            candle_nn::embedding(config.vocab_size, config.hidden_size, vb.pp("embedding"))?;
        let head = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self {
            embedding,
            head,
            hidden_size: config.hidden_size,
        })
    }

    /// Raw logit for one tokenized text, run as a batch of one.
    ///
    /// An empty token sequence pools to the zero vector.
    pub fn forward(&self, ids: &[u32], device: &Device) -> candle_core::Result<f32> {
        let pooled = if ids.is_empty() {
            Tensor::zeros((1, self.hidden_size), DType::F32, device)?
        } else {
            let input = Tensor::new(ids, device)?.unsqueeze(0)?;
            self.embedding.forward(&input)?.mean(1)?
        };

        self.head.forward(&pooled)?.flatten_all()?.get(0)?.to_scalar::<f32>()
    }
}

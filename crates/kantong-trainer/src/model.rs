//! Classifier model: embedding, mean pooling, and two dense layers.

use candle_core::{Result, Tensor, D};
use candle_nn::{embedding, linear, ops, Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};

/// Fixed model topology, persisted as `config.json` next to the weights so
/// the converter can rebuild the layer descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Embedding input dimension. Equals the vectorizer's vocabulary bound.
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    /// Output layer width. Equals the number of distinct labels.
    pub num_labels: usize,
    /// Sequence length every input row is padded or truncated to.
    pub max_sequence_length: usize,
}

/// Shallow text classifier.
///
/// Topology: embedding -> mean pooling over the sequence dimension ->
/// dense relu -> dense logits. Softmax is applied only at prediction time;
/// the training loss works on raw logits.
pub struct Classifier {
    embedding: Embedding,
    hidden: Linear,
    output: Linear,
}

impl Classifier {
    /// Build the model, creating (or loading) its variables through `vb`.
    pub fn new(config: &ModelConfig, vb: VarBuilder) -> Result<Self> {
        let embedding = embedding(config.vocab_size, config.embedding_dim, vb.pp("embedding"))?;
        let hidden = linear(config.embedding_dim, config.hidden_dim, vb.pp("hidden"))?;
        let output = linear(config.hidden_dim, config.num_labels, vb.pp("output"))?;

        Ok(Self {
            embedding,
            hidden,
            output,
        })
    }

    /// Compute logits for a batch of id sequences.
    ///
    /// `input_ids` has shape `[batch, seq_len]` (u32); the result has shape
    /// `[batch, num_labels]`.
    pub fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let embedded = self.embedding.forward(input_ids)?;
        // Global average pooling over the sequence dimension. Padding ids
        // participate, as they do in the browser runtime.
        let pooled = embedded.mean(1)?;
        let hidden = self.hidden.forward(&pooled)?.relu()?;
        self.output.forward(&hidden)
    }

    /// Class probabilities for a batch of id sequences.
    pub fn predict(&self, input_ids: &Tensor) -> Result<Tensor> {
        let logits = self.forward(input_ids)?;
        ops::softmax(&logits, D::Minus1)
    }
}

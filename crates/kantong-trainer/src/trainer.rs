//! Training loop for the transaction classifier.

use anyhow::{bail, Context};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};

use crate::model::{Classifier, ModelConfig};

/// Pipeline hyperparameters, fixed ahead of time rather than searched.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Vocabulary bound shared by the vectorizer and the embedding layer.
    pub max_vocab_size: usize,
    /// Fixed padding/truncation length for every input row.
    pub max_sequence_length: usize,
    /// Number of full passes over the corpus.
    pub epochs: usize,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for the per-epoch shuffle.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: 1000,
            max_sequence_length: 10,
            epochs: 20,
            embedding_dim: 16,
            hidden_dim: 16,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

/// A trained model together with its variables and topology description.
pub struct TrainedModel {
    pub model: Classifier,
    pub varmap: VarMap,
    pub config: ModelConfig,
    pub final_loss: f32,
    pub final_accuracy: f32,
}

/// Fit the classifier against vectorized inputs and encoded labels.
///
/// Runs `config.epochs` full passes with shuffled mini-batches, AdamW, and
/// sparse categorical cross-entropy. No validation split, no early stopping.
pub fn train(
    sequences: &[Vec<u32>],
    labels: &[u32],
    num_labels: usize,
    config: &TrainConfig,
    device: &Device,
) -> anyhow::Result<TrainedModel> {
    if sequences.is_empty() {
        bail!("no training rows");
    }
    if sequences.len() != labels.len() {
        bail!(
            "row count mismatch: {} sequences vs {} labels",
            sequences.len(),
            labels.len()
        );
    }

    let rows = sequences.len();
    let seq_len = config.max_sequence_length;
    let mut flat = Vec::with_capacity(rows * seq_len);
    for (i, sequence) in sequences.iter().enumerate() {
        if sequence.len() != seq_len {
            bail!("row {i} has length {}, expected {seq_len}", sequence.len());
        }
        flat.extend_from_slice(sequence);
    }

    let inputs =
        Tensor::from_vec(flat, (rows, seq_len), device).context("building input tensor")?;
    let targets =
        Tensor::from_vec(labels.to_vec(), rows, device).context("building target tensor")?;

    let model_config = ModelConfig {
        vocab_size: config.max_vocab_size,
        embedding_dim: config.embedding_dim,
        hidden_dim: config.hidden_dim,
        num_labels,
        max_sequence_length: seq_len,
    };

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = Classifier::new(&model_config, vb).context("building model")?;

    let params = ParamsAdamW {
        lr: config.learning_rate,
        ..ParamsAdamW::default()
    };
    let mut optimizer =
        AdamW::new(varmap.all_vars(), params).context("building optimizer")?;

    let mut rng = oorandom::Rand32::new(config.seed);
    let mut final_loss = f32::NAN;
    let mut final_accuracy = 0.0;

    for epoch in 1..=config.epochs {
        let mut indices: Vec<u32> = (0..rows as u32).collect();
        for i in (1..indices.len()).rev() {
            let j = rng.rand_range(0..i as u32 + 1) as usize;
            indices.swap(i, j);
        }

        let mut epoch_loss = 0.0f32;
        let mut correct = 0usize;

        for chunk in indices.chunks(config.batch_size) {
            let idx = Tensor::from_vec(chunk.to_vec(), chunk.len(), device)?;
            let batch_inputs = inputs.index_select(&idx, 0)?;
            let batch_targets = targets.index_select(&idx, 0)?;

            let logits = model.forward(&batch_inputs)?;
            let batch_loss = loss::cross_entropy(&logits, &batch_targets)?;
            optimizer.backward_step(&batch_loss)?;

            epoch_loss += batch_loss.to_scalar::<f32>()? * chunk.len() as f32;

            let predicted = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
            let truth = batch_targets.to_vec1::<u32>()?;
            correct += predicted
                .iter()
                .zip(truth.iter())
                .filter(|(p, t)| p == t)
                .count();
        }

        final_loss = epoch_loss / rows as f32;
        final_accuracy = correct as f32 / rows as f32;
        tracing::info!(
            epoch,
            epochs = config.epochs,
            loss = final_loss,
            accuracy = final_accuracy,
            "epoch complete"
        );
    }

    Ok(TrainedModel {
        model,
        varmap,
        config: model_config,
        final_loss,
        final_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_corpus() -> (Vec<Vec<u32>>, Vec<u32>) {
        let pad = |mut v: Vec<u32>| {
            v.resize(10, 0);
            v
        };
        let sequences = vec![
            pad(vec![2, 3]), // beli kopi
            pad(vec![4, 5]), // gaji bulanan
            pad(vec![2, 6]), // beli makan
        ];
        let labels = vec![0, 1, 0];
        (sequences, labels)
    }

    #[test]
    fn test_train_runs_and_reports() {
        let (sequences, labels) = tiny_corpus();
        let config = TrainConfig {
            max_vocab_size: 16,
            ..TrainConfig::default()
        };

        let trained = train(&sequences, &labels, 2, &config, &Device::Cpu).unwrap();
        assert!(trained.final_loss.is_finite());
        assert!(trained.final_loss > 0.0);
        assert!((0.0..=1.0).contains(&trained.final_accuracy));
        assert_eq!(trained.config.num_labels, 2);
        assert_eq!(trained.config.vocab_size, 16);
    }

    #[test]
    fn test_row_count_mismatch() {
        let (sequences, _) = tiny_corpus();
        let config = TrainConfig::default();
        assert!(train(&sequences, &[0, 1], 2, &config, &Device::Cpu).is_err());
    }

    #[test]
    fn test_wrong_sequence_length() {
        let config = TrainConfig::default();
        let sequences = vec![vec![2u32, 3]];
        assert!(train(&sequences, &[0], 2, &config, &Device::Cpu).is_err());
    }

    #[test]
    fn test_empty_input() {
        let config = TrainConfig::default();
        assert!(train(&[], &[], 2, &config, &Device::Cpu).is_err());
    }
}

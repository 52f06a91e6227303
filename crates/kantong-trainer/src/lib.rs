//! # Kantong Trainer
//!
//! Training and export pipeline for the transaction-text classifier. Loads a
//! labeled CSV corpus, encodes labels, vectorizes text, fits the embedding
//! classifier, and exports the result both in the framework-native format
//! and as a TensorFlow.js layers-model for in-app inference.

pub mod data;
pub mod export;
pub mod model;
pub mod trainer;

use std::path::PathBuf;

use candle_core::Device;
use kantong_core::{LabelEncoder, TextVectorizer, VectorizerConfig};

pub use export::{ExportOutcome, ExportPaths};
pub use model::{Classifier, ModelConfig};
pub use trainer::{train, TrainConfig, TrainedModel};

/// Where each pipeline artifact is written.
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    /// Input CSV with `text` and `kategori` columns.
    pub dataset: PathBuf,
    pub label_map: PathBuf,
    pub tokenizer: PathBuf,
    pub model_dir: PathBuf,
    pub web_dir: PathBuf
}

/// What a pipeline run produced.
pub struct PipelineSummary {
    pub rows: usize,
    pub num_labels: usize,
    pub final_loss: f32,
    pub final_accuracy: f32,
    /// `Ok` with the web model directory, or the conversion error. The
    /// intermediate model directory exists either way.
    pub web_model: anyhow::Result<PathBuf>
}

/// Run the full pipeline: load, encode, vectorize, train, export.
///
/// Each stage consumes the previous stage's output explicitly; only the
/// final conversion step is allowed to fail without aborting the run (its
/// result is surfaced in the summary).
pub fn run_pipeline(
    paths: &PipelinePaths,
    config: &TrainConfig,
) -> anyhow::Result<PipelineSummary> {
    let dataset = data::load_dataset(&paths.dataset)?;

    let (encoder, encoded_labels) = LabelEncoder::fit_transform(&dataset.labels)?;
    encoder.save_label_map(&paths.label_map)?;
    tracing::info!(classes = encoder.num_classes(), "encoded labels");

    let mut vectorizer = TextVectorizer::new(VectorizerConfig {
        max_vocab_size: config.max_vocab_size,
        max_sequence_length: config.max_sequence_length,
        ..VectorizerConfig::default()
    });
    vectorizer.fit(dataset.texts.iter().map(String::as_str))?;
    vectorizer.save(&paths.tokenizer)?;
    let sequences = vectorizer.vectorize_all(&dataset.texts)?;

    let trained = trainer::train(
        &sequences,
        &encoded_labels,
        encoder.num_classes(),
        config,
        &Device::Cpu,
    )?;

    let outcome = export::export(
        &trained,
        &ExportPaths {
            model_dir: paths.model_dir.clone(),
            web_dir: paths.web_dir.clone()
        },
    )?;

    Ok(PipelineSummary {
        rows: dataset.len(),
        num_labels: encoder.num_classes(),
        final_loss: trained.final_loss,
        final_accuracy: trained.final_accuracy,
        web_model: outcome.web_model
    })
}

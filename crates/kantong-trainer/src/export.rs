//! Model export: framework-native directory plus browser-runtime conversion.
//!
//! The intermediate `model/` directory holds `model.safetensors` and
//! `config.json`. Conversion rebuilds the layer topology from the config and
//! rewrites the weights as a TensorFlow.js layers-model: `model.json` with a
//! weights manifest, plus one little-endian f32 shard. Dense kernels are
//! transposed from candle's `[out, in]` layout to the `[in, out]` layout the
//! browser runtime expects; the embedding table is written as-is.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use safetensors::{Dtype, SafeTensors};
use serde_json::json;

use crate::model::ModelConfig;
use crate::trainer::TrainedModel;

/// Filesystem targets for the two export formats.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// Intermediate framework-native directory (`model/`).
    pub model_dir: PathBuf,
    /// Browser-runtime directory (`model-tfjs/`), recreated on every run.
    pub web_dir: PathBuf
}

/// What the exporter produced.
///
/// Conversion failure is non-fatal: it is captured here instead of
/// propagating, and the intermediate directory stays on disk as the
/// fallback artifact.
pub struct ExportOutcome {
    pub model_dir: PathBuf,
    pub web_model: anyhow::Result<PathBuf>
}

/// Serialize the trained model, then convert it for the browser runtime.
///
/// A pre-existing web directory is deleted recursively before conversion so
/// stale shards never survive a re-run.
pub fn export(trained: &TrainedModel, paths: &ExportPaths) -> anyhow::Result<ExportOutcome> {
    save_model_dir(trained, &paths.model_dir)?;

    if paths.web_dir.exists() {
        std::fs::remove_dir_all(&paths.web_dir).with_context(|| {
            format!("failed to clear web model dir {}", paths.web_dir.display())
        })?;
    }

    let web_model = convert_to_web(&paths.model_dir, &paths.web_dir);
    Ok(ExportOutcome {
        model_dir: paths.model_dir.clone(),
        web_model
    })
}

/// Write the framework-native model directory: weights + topology config.
pub fn save_model_dir(trained: &TrainedModel, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create model dir {}", dir.display()))?;

    trained
        .varmap
        .save(dir.join("model.safetensors"))
        .context("failed to write model.safetensors")?;

    let config_json = serde_json::to_string_pretty(&trained.config)?;
    std::fs::write(dir.join("config.json"), config_json)
        .context("failed to write config.json")?;

    tracing::info!(dir = %dir.display(), "saved model");
    Ok(())
}

/// Convert a saved model directory into the browser-runtime format.
///
/// Reads back `model.safetensors` + `config.json`, validates the weight
/// shapes against the topology, and writes `model.json` plus
/// `group1-shard1of1.bin` into `web_dir`.
pub fn convert_to_web(model_dir: &Path, web_dir: &Path) -> anyhow::Result<PathBuf> {
    let config_str = std::fs::read_to_string(model_dir.join("config.json"))
        .with_context(|| format!("failed to read config.json in {}", model_dir.display()))?;
    let config: ModelConfig =
        serde_json::from_str(&config_str).context("failed to parse config.json")?;

    let weight_bytes = std::fs::read(model_dir.join("model.safetensors"))
        .with_context(|| format!("failed to read model.safetensors in {}", model_dir.display()))?;
    let tensors =
        SafeTensors::deserialize(&weight_bytes).context("failed to parse model.safetensors")?;

    let (embed_shape, embed) = tensor_f32(&tensors, "embedding.weight")?;
    let (hidden_w_shape, hidden_w) = tensor_f32(&tensors, "hidden.weight")?;
    let (hidden_b_shape, hidden_b) = tensor_f32(&tensors, "hidden.bias")?;
    let (output_w_shape, output_w) = tensor_f32(&tensors, "output.weight")?;
    let (output_b_shape, output_b) = tensor_f32(&tensors, "output.bias")?;

    let v = config.vocab_size;
    let d = config.embedding_dim;
    let h = config.hidden_dim;
    let c = config.num_labels;

    check_shape("embedding.weight", &embed_shape, &[v, d])?;
    check_shape("hidden.weight", &hidden_w_shape, &[h, d])?;
    check_shape("hidden.bias", &hidden_b_shape, &[h])?;
    check_shape("output.weight", &output_w_shape, &[c, h])?;
    check_shape("output.bias", &output_b_shape, &[c])?;

    // candle stores dense weights as [out, in]; the layers-model kernel
    // layout is [in, out].
    let hidden_kernel = transpose(&hidden_w, h, d);
    let output_kernel = transpose(&output_w, c, h);

    let weights = [
        ("embedding/embeddings", vec![v, d], &embed),
        ("dense/kernel", vec![d, h], &hidden_kernel),
        ("dense/bias", vec![h], &hidden_b),
        ("dense_1/kernel", vec![h, c], &output_kernel),
        ("dense_1/bias", vec![c], &output_b)
    ];

    let mut shard = Vec::new();
    let mut manifest_entries = Vec::new();
    for (name, shape, data) in &weights {
        for value in data.iter() {
            shard.extend_from_slice(&value.to_le_bytes());
        }
        manifest_entries.push(json!({
            "name": name,
            "shape": shape,
            "dtype": "float32"
        }));
    }

    let model_json = json!({
        "format": "layers-model",
        "generatedBy": concat!("kantong-trainer ", env!("CARGO_PKG_VERSION")),
        "convertedBy": "kantong-trainer",
        "modelTopology": {
            "keras_version": "2.15.0",
            "backend": "tensorflow",
            "model_config": {
                "class_name": "Sequential",
                "config": {
                    "name": "kantong_classifier",
                    "layers": [
                        {
                            "class_name": "Embedding",
                            "config": {
                                "name": "embedding",
                                "batch_input_shape": [null, config.max_sequence_length],
                                "input_dim": v,
                                "output_dim": d,
                                "dtype": "float32"
                            }
                        },
                        {
                            "class_name": "GlobalAveragePooling1D",
                            "config": {
                                "name": "global_average_pooling1d",
                                "dtype": "float32"
                            }
                        },
                        {
                            "class_name": "Dense",
                            "config": {
                                "name": "dense",
                                "units": h,
                                "activation": "relu",
                                "use_bias": true,
                                "dtype": "float32"
                            }
                        },
                        {
                            "class_name": "Dense",
                            "config": {
                                "name": "dense_1",
                                "units": c,
                                "activation": "softmax",
                                "use_bias": true,
                                "dtype": "float32"
                            }
                        }
                    ]
                }
            }
        },
        "weightsManifest": [{
            "paths": ["group1-shard1of1.bin"],
            "weights": manifest_entries
        }]
    });

    std::fs::create_dir_all(web_dir)
        .with_context(|| format!("failed to create web model dir {}", web_dir.display()))?;
    std::fs::write(
        web_dir.join("model.json"),
        serde_json::to_string_pretty(&model_json)?,
    )
    .context("failed to write model.json")?;
    std::fs::write(web_dir.join("group1-shard1of1.bin"), &shard)
        .context("failed to write weight shard")?;

    tracing::info!(dir = %web_dir.display(), bytes = shard.len(), "converted model for the browser runtime");
    Ok(web_dir.to_path_buf())
}

/// Read a named f32 tensor from the safetensors file.
fn tensor_f32(tensors: &SafeTensors, name: &str) -> anyhow::Result<(Vec<usize>, Vec<f32>)> {
    let view = tensors
        .tensor(name)
        .with_context(|| format!("missing tensor {name}"))?;
    if view.dtype() != Dtype::F32 {
        bail!("tensor {name} has dtype {:?}, expected F32", view.dtype());
    }

    let data = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok((view.shape().to_vec(), data))
}

fn check_shape(name: &str, got: &[usize], want: &[usize]) -> anyhow::Result<()> {
    if got != want {
        bail!("tensor {name} has shape {got:?}, expected {want:?}");
    }
    Ok(())
}

/// Transpose a row-major `[rows, cols]` matrix into `[cols, rows]`.
fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

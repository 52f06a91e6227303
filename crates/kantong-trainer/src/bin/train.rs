use std::path::PathBuf;

use clap::Parser;
use kantong_trainer::{run_pipeline, PipelinePaths, TrainConfig};

/// Train the transaction classifier and export it for the app.
#[derive(Parser)]
#[command(name = "train", version, about)]
struct Args {
    /// CSV dataset with `text` and `kategori` columns.
    #[arg(long, default_value = "data.csv")]
    data: PathBuf,

    /// Output path for the id-to-label mapping.
    #[arg(long, default_value = "label_map.json")]
    label_map: PathBuf,

    /// Output path for the vectorizer state.
    #[arg(long, default_value = "tokenizer.json")]
    tokenizer: PathBuf,

    /// Output directory for the framework-native model.
    #[arg(long, default_value = "model")]
    model_dir: PathBuf,

    /// Output directory for the browser-runtime model.
    #[arg(long, default_value = "model-tfjs")]
    web_dir: PathBuf,

    /// Number of full passes over the corpus.
    #[arg(long, default_value_t = TrainConfig::default().epochs)]
    epochs: usize
}

fn run(args: Args) -> anyhow::Result<()> {
    let paths = PipelinePaths {
        dataset: args.data,
        label_map: args.label_map,
        tokenizer: args.tokenizer,
        model_dir: args.model_dir,
        web_dir: args.web_dir
    };
    let config = TrainConfig {
        epochs: args.epochs,
        ..TrainConfig::default()
    };

    let summary = run_pipeline(&paths, &config)?;

    match &summary.web_model {
        Ok(dir) => {
            tracing::info!(dir = %dir.display(), "web model conversion succeeded");
        }
        // Non-fatal: the framework-native model directory remains on disk.
        Err(e) => {
            tracing::error!(error = %e, "web model conversion failed");
        }
    }
    tracing::info!(
        rows = summary.rows,
        classes = summary.num_labels,
        loss = summary.final_loss,
        accuracy = summary.final_accuracy,
        "training run finished"
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}

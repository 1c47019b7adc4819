//! MRL model trainer
//!
//! Generates synthetic regimens, fits the linear risk model and writes the
//! artifact the service loads at startup, plus its checksum manifest and
//! the training data as CSV.

use anyhow::Context;
use clap::Parser;
use mrl_risk::config_loader::DEFAULT_MODEL_PATH;
use mrl_risk::features::FEATURE_NAMES;
use mrl_risk::log_sink::init_logging;
use mrl_risk::training::{run_training, write_training_csv, TrainingOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Train the MRL violation risk model", long_about = None)]
struct Args {
    /// Number of synthetic samples
    #[clap(long, default_value_t = 1000)]
    samples: usize,

    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// Share of samples held out for evaluation
    #[clap(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Model artifact path
    #[clap(short, long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Training data CSV path
    #[clap(long, default_value = "data/training_data.csv")]
    data: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging("trainer=info,mrl_risk=info");
    let args = Args::parse();

    let options = TrainingOptions {
        samples: args.samples,
        seed: args.seed,
        test_fraction: args.test_fraction,
    };
    let run = run_training(&options).context("Training failed")?;

    write_training_csv(&args.data, &run.samples)
        .with_context(|| format!("Failed to write {}", args.data.display()))?;
    info!(samples = run.samples.len(), path = %args.data.display(), "Training data saved");

    info!(
        mse = %format!("{:.4}", run.metrics.mse),
        r2 = %format!("{:.4}", run.metrics.r2),
        n_train = run.metrics.n_train,
        n_test = run.metrics.n_test,
        "Model performance"
    );
    for (name, weight) in FEATURE_NAMES.iter().zip(&run.model.coefficients) {
        info!(feature = *name, weight = %format!("{weight:.5}"), "Coefficient");
    }
    info!(intercept = %format!("{:.5}", run.model.intercept), "Intercept");

    let manifest = run
        .model
        .save(&args.output)
        .with_context(|| format!("Failed to save model to {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        sha256 = %manifest.sha256,
        "Model saved"
    );

    Ok(())
}

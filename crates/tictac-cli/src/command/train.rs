use std::{path::PathBuf, time::Instant};

use anyhow::Context as _;
use chrono::Utc;
use tictac_dataset::sample::TrainingSource;
use tictac_training::{
    init::WeightInit,
    mlp::{Mlp, MlpConfig},
    trainer::{EpochReport, Trainer, TrainerConfig},
};

use crate::{
    schema::report::TrainingReport,
    util::{self, Output},
};

/// Weight initialization scheme as named on the command line.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum InitArg {
    #[default]
    He,
    Xavier,
}

impl From<InitArg> for WeightInit {
    fn from(arg: InitArg) -> Self {
        match arg {
            InitArg::He => WeightInit::HeNormal,
            InitArg::Xavier => WeightInit::XavierUniform,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Dataset file produced by `generate-data`
    #[arg(long)]
    dataset: PathBuf,
    /// Which samples to train on (minimax, rulebased or all)
    #[arg(long, default_value = "minimax")]
    source: TrainingSource,
    /// Number of hidden units
    #[arg(long, default_value_t = MlpConfig::default().hidden_size)]
    hidden_size: usize,
    #[arg(long, default_value_t = TrainerConfig::default().learning_rate)]
    learning_rate: f32,
    #[arg(long, default_value_t = MlpConfig::default().momentum)]
    momentum: f32,
    /// Last epoch index (epochs run from 0 through this value)
    #[arg(long, default_value_t = TrainerConfig::default().max_epochs)]
    epochs: usize,
    /// Evaluate every N epochs
    #[arg(long, default_value_t = TrainerConfig::default().eval_interval)]
    eval_interval: usize,
    /// Stop when accuracy exceeds this fraction
    #[arg(long, default_value_t = TrainerConfig::default().target_accuracy)]
    target_accuracy: f32,
    /// Weight initialization (he or xavier)
    #[arg(long, default_value = "he")]
    init: InitArg,
    #[arg(long, default_value_t = MlpConfig::default().init_scale)]
    init_scale: f32,
    /// Seed for reproducible training
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the weight bundle
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output file path for the training report
    #[arg(long)]
    report: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        dataset: dataset_path,
        source,
        hidden_size,
        learning_rate,
        momentum,
        epochs,
        eval_interval,
        target_accuracy,
        init,
        init_scale,
        seed,
        output,
        report,
    } = arg;

    let mlp_config = MlpConfig {
        hidden_size: *hidden_size,
        momentum: *momentum,
        init: (*init).into(),
        init_scale: *init_scale,
    };
    let trainer_config = TrainerConfig {
        max_epochs: *epochs,
        learning_rate: *learning_rate,
        eval_interval: *eval_interval,
        target_accuracy: *target_accuracy,
    };
    let trainer = Trainer::new(trainer_config).context("Invalid trainer settings")?;

    let dataset = util::read_dataset_file(dataset_path)?;
    let mut samples = dataset.select(*source);
    eprintln!(
        "Loaded {} samples ({} rule-based, {} minimax); training on {source}",
        dataset.len(),
        dataset.rule_based.len(),
        dataset.minimax.len(),
    );

    let mut rng = util::build_rng(*seed);
    let mut mlp = Mlp::new(&mlp_config, &mut rng).context("Invalid network settings")?;
    eprintln!(
        "Network: 9 -> {hidden_size} -> 9, {} init (scale {init_scale}), momentum {momentum}",
        mlp_config.init,
    );

    let start = Instant::now();
    let summary = trainer.run(&mut mlp, &mut samples, &mut rng, print_report)?;
    let elapsed = start.elapsed();

    eprintln!();
    eprintln!(
        "Training finished after {} epochs ({})",
        summary.epochs_run, summary.stop_reason
    );
    eprintln!("  Time: {:.2}s", elapsed.as_secs_f64());
    let metrics = summary.last_report.metrics;
    eprintln!("  Final loss: {:.4}", metrics.loss);
    eprintln!("  Final accuracy: {:.2}%", metrics.accuracy * 100.0);

    Output::save_json(&mlp.to_bundle(), output.clone())?;
    eprintln!();
    eprintln!("Weights saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Hidden units: {}", mlp.hidden_size());

    if let Some(path) = report {
        let report = TrainingReport {
            trained_at: Utc::now(),
            dataset: dataset_path.clone(),
            source: source.to_string(),
            samples: samples.len(),
            hidden_size: mlp.hidden_size(),
            learning_rate: *learning_rate,
            momentum: *momentum,
            init: mlp_config.init.to_string(),
            init_scale: *init_scale,
            seed: *seed,
            epochs_run: summary.epochs_run,
            stop_reason: summary.stop_reason.to_string(),
            final_loss: metrics.loss,
            final_accuracy: metrics.accuracy,
            elapsed_secs: elapsed.as_secs_f64(),
        };
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("  Report: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &EpochReport) {
    let EpochReport { epoch, metrics } = report;
    eprintln!(
        "Epoch {epoch} | Loss {:.4} | Accuracy {:.2}%",
        metrics.loss,
        metrics.accuracy * 100.0
    );
}

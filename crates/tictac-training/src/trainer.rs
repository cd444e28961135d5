//! Epoch loop: shuffle, one SGD step per sample, periodic evaluation, early stop.

use rand::{Rng, seq::SliceRandom as _};
use tictac_dataset::sample::Sample;

use crate::{ConfigError, mlp::{Mlp, cross_entropy}};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Last epoch index; epochs run `0..=max_epochs`.
    pub max_epochs: usize,
    pub learning_rate: f32,
    /// Evaluate when `epoch % eval_interval == 0`.
    pub eval_interval: usize,
    /// Stop once accuracy (a fraction in `(0, 1]`) exceeds this value.
    pub target_accuracy: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_epochs: 3000,
            learning_rate: 0.002,
            eval_interval: 100,
            target_accuracy: 0.995,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::LearningRate {
                value: self.learning_rate,
            });
        }
        if self.eval_interval == 0 {
            return Err(ConfigError::ZeroEvalInterval);
        }
        if !(self.target_accuracy > 0.0 && self.target_accuracy <= 1.0) {
            return Err(ConfigError::TargetAccuracy {
                value: self.target_accuracy,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("no training samples")]
    EmptyDataset,
    #[display("invalid trainer configuration")]
    #[from]
    Config(#[error(source)] ConfigError),
}

/// Loss and top-1 accuracy over a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Mean cross-entropy.
    pub loss: f32,
    /// Fraction of samples whose most probable cell is the target cell.
    pub accuracy: f32,
    pub samples: usize,
}

/// Runs the network on every sample without training.
///
/// Ties in the output go to the lowest cell index.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn evaluate(mlp: &Mlp, samples: &[Sample]) -> Metrics {
    let mut total_loss = 0.0;
    let mut correct = 0;
    for sample in samples {
        let probabilities = mlp.predict(&sample.input());
        total_loss += cross_entropy(&probabilities, &sample.target());
        if argmax(&probabilities) == sample.target_move() {
            correct += 1;
        }
    }
    let n = samples.len().max(1) as f32;
    Metrics {
        loss: total_loss / n,
        accuracy: correct as f32 / n,
        samples: samples.len(),
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StopReason {
    #[display("target accuracy reached")]
    TargetAccuracy,
    #[display("epoch limit reached")]
    EpochLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    pub last_report: EpochReport,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Trains `mlp` in place on `samples`.
    ///
    /// `samples` is reshuffled at the start of every epoch. `on_report` receives
    /// each periodic evaluation plus the final one; when the loop ends on an
    /// evaluation epoch that report is not repeated.
    pub fn run<R, F>(
        &self,
        mlp: &mut Mlp,
        samples: &mut [Sample],
        rng: &mut R,
        mut on_report: F,
    ) -> Result<TrainingSummary, TrainingError>
    where
        R: Rng + ?Sized,
        F: FnMut(&EpochReport),
    {
        if samples.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        let TrainerConfig {
            max_epochs,
            learning_rate,
            eval_interval,
            target_accuracy,
        } = self.config;

        let mut last_report = None;
        let mut stop_reason = StopReason::EpochLimit;
        let mut epochs_run = 0;
        for epoch in 0..=max_epochs {
            samples.shuffle(rng);
            for sample in samples.iter() {
                mlp.train(&sample.input(), &sample.target(), learning_rate);
            }
            epochs_run = epoch + 1;

            if epoch % eval_interval == 0 {
                let report = EpochReport {
                    epoch,
                    metrics: evaluate(mlp, samples),
                };
                on_report(&report);
                last_report = Some(report);
                if report.metrics.accuracy > target_accuracy {
                    log::info!("stopping at epoch {epoch}: accuracy {:.4}", report.metrics.accuracy);
                    stop_reason = StopReason::TargetAccuracy;
                    break;
                }
            }
        }

        let last_epoch = epochs_run - 1;
        let last_report = match last_report {
            Some(report) if report.epoch == last_epoch => report,
            _ => {
                let report = EpochReport {
                    epoch: last_epoch,
                    metrics: evaluate(mlp, samples),
                };
                on_report(&report);
                report
            }
        };
        Ok(TrainingSummary {
            epochs_run,
            last_report,
            stop_reason,
        })
    }
}

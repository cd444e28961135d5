use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary written next to a weight bundle.
///
/// The bundle itself does not record the hidden width; this report does.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub source: String,
    pub samples: usize,
    pub hidden_size: usize,
    pub learning_rate: f32,
    pub momentum: f32,
    pub init: String,
    pub init_scale: f32,
    pub seed: Option<u64>,
    pub epochs_run: usize,
    pub stop_reason: String,
    pub final_loss: f32,
    pub final_accuracy: f32,
    pub elapsed_secs: f64,
}

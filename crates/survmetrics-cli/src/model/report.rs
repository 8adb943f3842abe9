use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survmetrics_eval::{
    censoring::{CensoringEstimator, ProbabilityFloor},
    metric::MetricResult,
};

/// Output of the `evaluate` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Timestamp when the evaluation was run (ISO 8601 format)
    pub evaluated_at: DateTime<Utc>,
    pub dataset: PathBuf,
    pub n_training: usize,
    pub n_testing: usize,
    pub eval_times: Vec<f64>,
    pub censoring: CensoringSummary,
    pub metrics: Vec<MetricResult>,
}

/// Summary of the censoring model used for weighting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensoringSummary {
    /// Saved model file, when the model was not fitted from the dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    pub floor: ProbabilityFloor,
    pub n_observations: usize,
    pub n_censored: usize,
    pub degenerate: bool,
    pub median_follow_up: Option<f64>,
}

impl CensoringSummary {
    pub fn new(estimator: &CensoringEstimator, model_path: Option<PathBuf>) -> Self {
        Self {
            model_path,
            floor: estimator.floor(),
            n_observations: estimator.n_observations(),
            n_censored: estimator.n_censored(),
            degenerate: estimator.is_degenerate(),
            median_follow_up: estimator.median_follow_up(),
        }
    }
}

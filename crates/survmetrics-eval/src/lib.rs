//! Censoring-aware dynamic performance metrics for survival models
//!
//! This crate evaluates predicted survival probabilities against right-censored
//! outcomes at chosen evaluation times, using inverse probability of censoring
//! weighting (IPCW).
//!
//! # Overview
//!
//! The evaluation runs in three stages:
//!
//! 1. **Censoring Weight Estimator** ([`censoring::CensoringEstimator`]): fitted once
//!    per training sample as a reverse Kaplan-Meier curve
//! 2. **Binary Outcome Encoder** ([`category::Category`]): classifies each
//!    observation at each evaluation time as event, non-event or unusable
//! 3. **Weighted Metric Aggregator** ([`metric`]): folds categories, predictions and
//!    weights into Brier scores, ROC AUC and confusion-matrix metrics
//!
//! Stages 1 and 2 feed a flat [`frame::EvaluationFrame`], built once per request and
//! shared by every metric.
//!
//! # Examples
//!
//! ```
//! use survmetrics_eval::{
//!     aggregate_metric, censoring::EstimatorConfig, encode_category, fit_censoring_estimator,
//!     category::Category, frame::PredictedSurvival, metric::MetricKind,
//!     observation::Observation,
//! };
//! # fn main() -> Result<(), survmetrics_eval::error::EvalError> {
//!
//! let observations = [
//!     Observation::event(4.83)?,
//!     Observation::event(6.11)?,
//!     Observation::censored(6.60)?,
//!     Observation::event(2.72)?,
//! ];
//! let estimator = fit_censoring_estimator(&observations, &EstimatorConfig::default())?;
//!
//! assert_eq!(encode_category(&observations[0], 5.0)?, Category::Event);
//! assert_eq!(encode_category(&observations[2], 5.0)?, Category::NonEvent);
//!
//! let predictions = [0.3, 0.8, 0.7, 0.1]
//!     .map(|survival| vec![PredictedSurvival { eval_time: 5.0, survival }]);
//! let brier = aggregate_metric(
//!     MetricKind::BrierScore,
//!     &estimator,
//!     &observations,
//!     &predictions,
//!     &[5.0],
//! )?;
//! assert!(brier.scalar_at(5.0).is_some());
//! # Ok(())
//! # }
//! ```

pub mod category;
pub mod censoring;
pub mod error;
pub mod frame;
pub mod metric;
pub mod observation;

use self::{
    category::Category,
    censoring::{CensoringEstimator, EstimatorConfig},
    error::EvalError,
    frame::{EvaluationFrame, PredictedSurvival},
    metric::{MetricKind, MetricResult},
    observation::Observation,
};

/// Fits the censoring distribution of a training sample.
pub fn fit_censoring_estimator(
    training: &[Observation],
    config: &EstimatorConfig,
) -> Result<CensoringEstimator, EvalError> {
    CensoringEstimator::fit(training, config)
}

/// Classifies one observation at one evaluation time.
pub fn encode_category(observation: &Observation, eval_time: f64) -> Result<Category, EvalError> {
    Category::classify(observation, eval_time)
}

/// Censoring weight of one observation at one evaluation time.
///
/// `Ok(None)` means the observation is unusable at `eval_time`.
pub fn censoring_weight(
    estimator: &CensoringEstimator,
    observation: &Observation,
    eval_time: f64,
) -> Result<Option<f64>, EvalError> {
    estimator.censoring_weight(observation, eval_time)
}

/// Computes one metric at each of `eval_times`.
///
/// `predictions[i]` holds the predicted survival of `observations[i]` at every
/// evaluation time.
pub fn aggregate_metric<P>(
    kind: MetricKind,
    estimator: &CensoringEstimator,
    observations: &[Observation],
    predictions: &[P],
    eval_times: &[f64],
) -> Result<MetricResult, EvalError>
where
    P: AsRef<[PredictedSurvival]> + Sync,
{
    let frame = EvaluationFrame::build(estimator, observations, predictions, eval_times)?;
    metric::aggregate(kind, &frame)
}

/// Computes several metrics over one shared evaluation frame.
pub fn aggregate_metrics<P>(
    kinds: &[MetricKind],
    estimator: &CensoringEstimator,
    observations: &[Observation],
    predictions: &[P],
    eval_times: &[f64],
) -> Result<Vec<MetricResult>, EvalError>
where
    P: AsRef<[PredictedSurvival]> + Sync,
{
    let frame = EvaluationFrame::build(estimator, observations, predictions, eval_times)?;
    kinds
        .iter()
        .map(|&kind| metric::aggregate(kind, &frame))
        .collect()
}

//! Weighted metric aggregation
//!
//! Metrics are selected by [`MetricKind`], a closed set of variants each with
//! its own aggregation function. All of them read the same
//! [`EvaluationFrame`] and produce a [`MetricResult`] with one entry per
//! evaluation time.
//!
//! # Undefined values
//!
//! A per-time value is `None` (serialized as `null`) when it cannot be computed:
//! no usable rows at that time, or a zero denominator in a confusion-matrix rate.
//! ROC AUC with usable rows of only one class is `0.5`.

mod brier;
mod confusion;
mod roc_auc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use self::confusion::ConfusionMatrix;
use crate::{error::EvalError, frame::EvaluationFrame};

/// Default survival-probability threshold for class predictions.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Metric to compute at each evaluation time.
///
/// Classification metrics predict a non-event when the predicted survival is
/// at least `threshold`, and an event otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    /// Censoring-weighted Brier score, with its integrated value.
    BrierScore,
    /// Censoring-weighted ROC AUC.
    RocAuc,
    /// Weighted 2x2 contingency table.
    ConfusionMatrix { threshold: f64 },
    Sensitivity { threshold: f64 },
    Specificity { threshold: f64 },
    Precision { threshold: f64 },
    MissRate { threshold: f64 },
    FallOut { threshold: f64 },
    Accuracy { threshold: f64 },
}

impl MetricKind {
    /// Short identifier of the metric.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BrierScore => "brier_score",
            Self::RocAuc => "roc_auc",
            Self::ConfusionMatrix { .. } => "confusion_matrix",
            Self::Sensitivity { .. } => "sensitivity",
            Self::Specificity { .. } => "specificity",
            Self::Precision { .. } => "precision",
            Self::MissRate { .. } => "miss_rate",
            Self::FallOut { .. } => "fall_out",
            Self::Accuracy { .. } => "accuracy",
        }
    }

    /// Classification threshold, for metrics that use one.
    #[must_use]
    pub fn threshold(&self) -> Option<f64> {
        match *self {
            Self::BrierScore | Self::RocAuc => None,
            Self::ConfusionMatrix { threshold }
            | Self::Sensitivity { threshold }
            | Self::Specificity { threshold }
            | Self::Precision { threshold }
            | Self::MissRate { threshold }
            | Self::FallOut { threshold }
            | Self::Accuracy { threshold } => Some(threshold),
        }
    }

    fn validate(&self) -> Result<(), EvalError> {
        match self.threshold() {
            Some(value) if !(0.0..=1.0).contains(&value) => {
                Err(EvalError::InvalidThreshold { value })
            }
            _ => Ok(()),
        }
    }
}

/// Value of a metric at one evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(Option<f64>),
    Table(ConfusionMatrix),
}

impl MetricValue {
    /// The scalar value, if this is a defined scalar.
    #[must_use]
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => *value,
            Self::Table(_) => None,
        }
    }

    #[must_use]
    pub fn table(&self) -> Option<&ConfusionMatrix> {
        match self {
            Self::Scalar(_) => None,
            Self::Table(table) => Some(table),
        }
    }
}

/// Metric value at one evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeMetric {
    pub eval_time: f64,
    /// Number of observations that took part at this time.
    pub n_usable: usize,
    pub value: MetricValue,
}

/// A metric evaluated over a set of evaluation times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: MetricKind,
    pub n_observations: usize,
    /// Entries sorted by evaluation time.
    pub per_time: Vec<TimeMetric>,
    /// Summary over all evaluation times, for metrics that define one.
    pub integrated: Option<f64>,
}

impl MetricResult {
    /// Scalar value at `eval_time`, if the time was evaluated and the value is defined.
    #[must_use]
    pub fn scalar_at(&self, eval_time: f64) -> Option<f64> {
        self.per_time
            .iter()
            .find(|entry| entry.eval_time == eval_time)
            .and_then(|entry| entry.value.scalar())
    }

    /// Iterates over `(evaluation time, scalar value)` pairs.
    pub fn scalars(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.per_time
            .iter()
            .map(|entry| (entry.eval_time, entry.value.scalar()))
    }
}

/// Computes `kind` at every evaluation time of `frame`.
///
/// Evaluation times are processed in parallel.
pub fn aggregate(kind: MetricKind, frame: &EvaluationFrame) -> Result<MetricResult, EvalError> {
    kind.validate()?;
    let n_observations = frame.n_observations();

    let per_time = (0..frame.eval_times().len())
        .into_par_iter()
        .map(|index| {
            let rows = frame.rows_at(index);
            let value = match kind {
                MetricKind::BrierScore => {
                    MetricValue::Scalar(brier::brier_score(rows, n_observations))
                }
                MetricKind::RocAuc => MetricValue::Scalar(roc_auc::roc_auc(rows)),
                MetricKind::ConfusionMatrix { threshold } => {
                    MetricValue::Table(ConfusionMatrix::from_rows(rows, threshold))
                }
                MetricKind::Sensitivity { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).sensitivity(),
                ),
                MetricKind::Specificity { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).specificity(),
                ),
                MetricKind::Precision { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).precision(),
                ),
                MetricKind::MissRate { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).miss_rate(),
                ),
                MetricKind::FallOut { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).fall_out(),
                ),
                MetricKind::Accuracy { threshold } => MetricValue::Scalar(
                    ConfusionMatrix::from_rows(rows, threshold).accuracy(),
                ),
            };
            TimeMetric {
                eval_time: frame.eval_times()[index],
                n_usable: frame.n_usable(index),
                value,
            }
        })
        .collect::<Vec<_>>();

    let integrated = match kind {
        MetricKind::BrierScore => {
            let values = per_time
                .iter()
                .map(|entry| (entry.eval_time, entry.value.scalar()))
                .collect::<Vec<_>>();
            brier::integrated_brier_score(&values)
        }
        _ => None,
    };

    Ok(MetricResult {
        metric: kind,
        n_observations,
        per_time,
        integrated,
    })
}

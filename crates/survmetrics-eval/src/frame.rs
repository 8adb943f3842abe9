//! Flat evaluation frame
//!
//! Every metric consumes the same per-(observation, evaluation time) facts:
//! the category, the censoring weight and the predicted survival probability.
//! [`EvaluationFrame::build`] computes them once for a whole request:
//!
//! ```text
//! observations × evaluation times
//!     ↓ encode category, query censoring weight, look up prediction
//! rows: [t0: obs 0..n] [t1: obs 0..n] ... [tk: obs 0..n]
//!     ↓
//! Brier / ROC AUC / confusion-matrix aggregators
//! ```
//!
//! Rows are stored time-major, one block of `n` rows per evaluation time, with
//! the evaluation times sorted ascending and deduplicated.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    category::{Category, CategoryCounts},
    censoring::CensoringEstimator,
    error::{EvalError, check_time},
    observation::Observation,
};

/// A model's predicted probability of being event-free at one evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedSurvival {
    pub eval_time: f64,
    pub survival: f64,
}

/// One observation at one evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationRow {
    /// Index of the observation in the request.
    pub observation: usize,
    pub eval_time: f64,
    pub category: Category,
    /// Censoring weight; `None` when the row takes no part in metrics.
    pub weight: Option<f64>,
    /// Predicted survival probability at `eval_time`.
    pub survival: f64,
}

impl EvaluationRow {
    /// Returns the weight and whether the row is an event, if the row is usable.
    #[must_use]
    pub fn usable(&self) -> Option<(f64, bool)> {
        match (self.category, self.weight) {
            (Category::Event, Some(weight)) => Some((weight, true)),
            (Category::NonEvent, Some(weight)) => Some((weight, false)),
            _ => None,
        }
    }
}

/// Rows for every observation at every evaluation time.
#[derive(Debug, Clone)]
pub struct EvaluationFrame {
    eval_times: Vec<f64>,
    n_observations: usize,
    rows: Vec<EvaluationRow>,
}

/// Validates evaluation times and returns them sorted and deduplicated.
pub fn normalize_eval_times(eval_times: &[f64]) -> Result<Vec<f64>, EvalError> {
    let mut times = eval_times
        .iter()
        .map(|&t| check_time("evaluation time", t))
        .collect::<Result<Vec<_>, _>>()?;
    if times.is_empty() {
        return Err(EvalError::EmptyEvaluationTimes);
    }
    times.sort_by(f64::total_cmp);
    times.dedup();
    Ok(times)
}

impl EvaluationFrame {
    /// Encodes and weights every observation at every evaluation time.
    ///
    /// `predictions[i]` holds observation `i`'s predicted survival, one entry per
    /// evaluation time, matched by exact time value.
    pub fn build<P>(
        estimator: &CensoringEstimator,
        observations: &[Observation],
        predictions: &[P],
        eval_times: &[f64],
    ) -> Result<Self, EvalError>
    where
        P: AsRef<[PredictedSurvival]> + Sync,
    {
        if observations.len() != predictions.len() {
            return Err(EvalError::PredictionCountMismatch {
                observations: observations.len(),
                predictions: predictions.len(),
            });
        }
        let eval_times = normalize_eval_times(eval_times)?;

        if let Some(max_time) = estimator.max_time() {
            for &t in eval_times.iter().filter(|&&t| t > max_time) {
                log::warn!(
                    "evaluation time {t} is beyond the last training time {max_time}; censoring weights are extrapolated"
                );
            }
        }

        let blocks = eval_times
            .par_iter()
            .map(|&eval_time| {
                observations
                    .iter()
                    .zip(predictions)
                    .enumerate()
                    .map(|(index, (observation, predicted))| {
                        let survival = lookup_survival(index, predicted.as_ref(), eval_time)?;
                        let category = Category::classify_checked(observation, eval_time);
                        let weight = estimator.weight_for(category, observation, eval_time);
                        Ok(EvaluationRow {
                            observation: index,
                            eval_time,
                            category,
                            weight,
                            survival,
                        })
                    })
                    .collect::<Result<Vec<_>, EvalError>>()
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        Ok(Self {
            eval_times,
            n_observations: observations.len(),
            rows: blocks.into_iter().flatten().collect(),
        })
    }

    /// Sorted, deduplicated evaluation times.
    #[must_use]
    pub fn eval_times(&self) -> &[f64] {
        &self.eval_times
    }

    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// All rows, time-major.
    #[must_use]
    pub fn rows(&self) -> &[EvaluationRow] {
        &self.rows
    }

    /// Rows for the evaluation time at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn rows_at(&self, index: usize) -> &[EvaluationRow] {
        assert!(index < self.eval_times.len(), "evaluation time index out of range");
        let n = self.n_observations;
        &self.rows[index * n..(index + 1) * n]
    }

    /// Iterates over `(evaluation time, rows)` blocks.
    pub fn by_time(&self) -> impl Iterator<Item = (f64, &[EvaluationRow])> + '_ {
        self.eval_times
            .iter()
            .enumerate()
            .map(|(index, &t)| (t, self.rows_at(index)))
    }

    /// Category counts at the evaluation time at `index`.
    #[must_use]
    pub fn category_counts(&self, index: usize) -> CategoryCounts {
        CategoryCounts::from_categories(self.rows_at(index).iter().map(|row| row.category))
    }

    /// Number of rows that take part in metrics at the evaluation time at `index`.
    #[must_use]
    pub fn n_usable(&self, index: usize) -> usize {
        self.rows_at(index)
            .iter()
            .filter(|row| row.usable().is_some())
            .count()
    }
}

fn lookup_survival(
    observation: usize,
    predicted: &[PredictedSurvival],
    eval_time: f64,
) -> Result<f64, EvalError> {
    let value = predicted
        .iter()
        .find(|p| p.eval_time == eval_time)
        .map(|p| p.survival)
        .ok_or(EvalError::MissingPrediction {
            observation,
            eval_time,
        })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(EvalError::InvalidSurvivalProbability {
            observation,
            eval_time,
            value,
        });
    }
    Ok(value)
}

//! Inverse probability of censoring weights
//!
//! Censored observations drop out of the usable set as the evaluation time grows,
//! and the ones that remain over-represent subjects with long follow-up. Each
//! usable observation is therefore weighted by the inverse of the estimated
//! probability that it would still be uncensored when its outcome became known.
//!
//! # Estimator
//!
//! The censoring distribution is estimated without covariates (non-informative
//! censoring) by a reverse Kaplan-Meier curve: censorings are counted as the
//! outcome and events as censoring. `G(u)` is the estimated probability of not
//! having been censored at or before `u`; `G(0) = 1` and `G` is non-increasing.
//!
//! A training sample that is empty or has no censored rows carries no
//! information about censoring. The estimator then has no jump points and
//! `G(u) = 1` everywhere, so every weight is `1`.
//!
//! # Weight time
//!
//! | category   | weight time `w` |
//! |------------|-----------------|
//! | `Event`    | observed time   |
//! | `NonEvent` | evaluation time |
//! | `Unusable` | no weight       |
//!
//! The curve is read just before `w` (`G(w-)`), so censorings recorded exactly
//! at `w` are not yet counted. The weight is `1 / G(w-)`.
//!
//! # Vanishing probabilities
//!
//! `G(w-)` reaches zero once every training subject at risk has been censored.
//! [`ProbabilityFloor`] selects how that is handled:
//!
//! - [`ProbabilityFloor::Truncate`] raises probabilities below
//!   `min(trunc, smallest positive G / 2)` to that floor, capping weights.
//! - [`ProbabilityFloor::Exclude`] gives no weight when `G(w-) == 0`; the
//!   observation is then unusable at that evaluation time.

use serde::{Deserialize, Serialize};
use survmetrics_stats::survival::KaplanMeierCurve;

use crate::{
    category::Category,
    error::{EvalError, check_time},
    observation::Observation,
};

/// Default truncation level for [`ProbabilityFloor::Truncate`].
pub const DEFAULT_TRUNCATION: f64 = 0.01;

/// Policy for censoring probabilities that vanish before the weight time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ProbabilityFloor {
    /// Raise small probabilities to `min(trunc, smallest positive G / 2)`.
    Truncate { trunc: f64 },
    /// Treat observations with `G(w-) == 0` as unusable.
    Exclude,
}

impl Default for ProbabilityFloor {
    fn default() -> Self {
        Self::Truncate {
            trunc: DEFAULT_TRUNCATION,
        }
    }
}

/// Settings for fitting a [`CensoringEstimator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub floor: ProbabilityFloor,
}

/// Fitted censoring distribution of a training sample.
///
/// Immutable once fitted; share it by reference across threads.
///
/// # Examples
///
/// ```
/// use survmetrics_eval::{
///     censoring::{CensoringEstimator, EstimatorConfig},
///     observation::Observation,
/// };
///
/// let training = [
///     Observation::event(1.0).unwrap(),
///     Observation::censored(2.0).unwrap(),
///     Observation::event(3.0).unwrap(),
///     Observation::event(4.0).unwrap(),
/// ];
/// let estimator = CensoringEstimator::fit(&training, &EstimatorConfig::default()).unwrap();
///
/// // Three subjects were at risk of censoring at time 2
/// let weight = estimator
///     .censoring_weight(&Observation::event(3.5).unwrap(), 5.0)
///     .unwrap()
///     .unwrap();
/// assert!((weight - 1.5).abs() < 1e-12);
/// ```
///
/// A saved estimator is checked again when it is deserialized, so a loaded
/// model satisfies the same invariants as a freshly fitted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCensoringEstimator")]
pub struct CensoringEstimator {
    curve: KaplanMeierCurve,
    floor: ProbabilityFloor,
    /// Resolved lower bound for [`ProbabilityFloor::Truncate`].
    min_prob: Option<f64>,
    n_observations: usize,
    n_censored: usize,
    max_time: Option<f64>,
}

#[derive(Deserialize)]
struct RawCensoringEstimator {
    curve: KaplanMeierCurve,
    floor: ProbabilityFloor,
    min_prob: Option<f64>,
    n_observations: usize,
    n_censored: usize,
    max_time: Option<f64>,
}

impl TryFrom<RawCensoringEstimator> for CensoringEstimator {
    type Error = EvalError;

    fn try_from(raw: RawCensoringEstimator) -> Result<Self, Self::Error> {
        let invalid = |reason| Err(EvalError::InvalidCensoringModel { reason });
        let curve = &raw.curve;
        let n = curve.times.len();

        if curve.survival_prob.len() != n || curve.at_risk.len() != n || curve.events.len() != n {
            return invalid("curve vectors differ in length");
        }
        if !curve.times.iter().all(|t| t.is_finite() && *t >= 0.0) {
            return invalid("curve times must be finite and non-negative");
        }
        if !curve.times.is_sorted_by(|a, b| a < b) {
            return invalid("curve times must be strictly increasing");
        }
        if !curve.survival_prob.iter().all(|p| (0.0..=1.0).contains(p)) {
            return invalid("curve probabilities must be in [0, 1]");
        }
        if !curve.survival_prob.is_sorted_by(|a, b| a >= b) {
            return invalid("curve probabilities must be non-increasing");
        }

        match (raw.floor, raw.min_prob) {
            (ProbabilityFloor::Truncate { trunc }, _) if !(trunc > 0.0 && trunc <= 1.0) => {
                return Err(EvalError::InvalidTruncation { value: trunc });
            }
            (ProbabilityFloor::Truncate { trunc }, Some(min_prob))
                if min_prob > 0.0 && min_prob <= trunc => {}
            (ProbabilityFloor::Truncate { .. }, _) => {
                return invalid("truncation floor must be in (0, trunc]");
            }
            (ProbabilityFloor::Exclude, None) => {}
            (ProbabilityFloor::Exclude, Some(_)) => {
                return invalid("exclude policy takes no truncation floor");
            }
        }

        if raw.n_censored > raw.n_observations {
            return invalid("more censored rows than observations");
        }
        if raw.max_time.is_some_and(|t| !t.is_finite() || t < 0.0) {
            return invalid("last training time must be finite and non-negative");
        }

        Ok(Self {
            curve: raw.curve,
            floor: raw.floor,
            min_prob: raw.min_prob,
            n_observations: raw.n_observations,
            n_censored: raw.n_censored,
            max_time: raw.max_time,
        })
    }
}

impl CensoringEstimator {
    /// Fits the reverse Kaplan-Meier curve of `training`.
    ///
    /// Fails only for an invalid truncation level; degenerate samples yield
    /// the constant curve.
    pub fn fit(training: &[Observation], config: &EstimatorConfig) -> Result<Self, EvalError> {
        match config.floor {
            ProbabilityFloor::Truncate { trunc } if !(trunc > 0.0 && trunc <= 1.0) => {
                return Err(EvalError::InvalidTruncation { value: trunc });
            }
            _ => {}
        }

        let n_observations = training.len();
        let n_censored = training.iter().filter(|obs| obs.is_censored()).count();
        let max_time = training
            .iter()
            .map(Observation::time)
            .max_by(f64::total_cmp);

        let curve = KaplanMeierCurve::from_data_reversed(
            training
                .iter()
                .map(|obs| (obs.time(), obs.is_censored()))
                .collect(),
        );

        if curve.is_constant() {
            log::warn!(
                "no censored observations among {n_observations} training rows; censoring weights are all 1"
            );
        }

        let min_prob = match config.floor {
            ProbabilityFloor::Truncate { trunc } => Some(
                curve
                    .min_positive_prob()
                    .map_or(trunc, |min_positive| trunc.min(min_positive / 2.0)),
            ),
            ProbabilityFloor::Exclude => None,
        };

        log::debug!(
            "fitted censoring curve: {} jump points, {n_censored}/{n_observations} censored",
            curve.times.len()
        );

        Ok(Self {
            curve,
            floor: config.floor,
            min_prob,
            n_observations,
            n_censored,
            max_time,
        })
    }

    /// The reverse Kaplan-Meier step function.
    #[must_use]
    pub fn curve(&self) -> &KaplanMeierCurve {
        &self.curve
    }

    #[must_use]
    pub fn floor(&self) -> ProbabilityFloor {
        self.floor
    }

    /// Number of training observations.
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// Number of censored training observations.
    #[must_use]
    pub fn n_censored(&self) -> usize {
        self.n_censored
    }

    /// Largest observed training time, if any.
    #[must_use]
    pub fn max_time(&self) -> Option<f64> {
        self.max_time
    }

    /// Returns `true` if the sample carried no censoring information.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.curve.is_constant()
    }

    /// Median follow-up time: the median of the reverse Kaplan-Meier curve.
    #[must_use]
    pub fn median_follow_up(&self) -> Option<f64> {
        self.curve.median_survival()
    }

    /// Estimated probability of having been censored at or before `time`, `1 - G(time)`.
    #[must_use]
    pub fn probability_censored_by(&self, time: f64) -> f64 {
        1.0 - self.curve.survival_at(time)
    }

    /// Estimated probability of not yet being censored just before `time`, `G(time-)`.
    #[must_use]
    pub fn probability_uncensored_before(&self, time: f64) -> f64 {
        self.curve.survival_before(time)
    }

    /// Inverse probability weight for an outcome that became known at `weight_time`.
    ///
    /// Returns `None` only under [`ProbabilityFloor::Exclude`] when `G(w-)` is zero.
    #[must_use]
    pub fn weight_at(&self, weight_time: f64) -> Option<f64> {
        let prob = self.probability_uncensored_before(weight_time);
        match (self.floor, self.min_prob) {
            (ProbabilityFloor::Truncate { .. }, Some(min_prob)) if prob < min_prob => {
                log::debug!(
                    "censoring probability {prob} at time {weight_time} truncated to {min_prob}"
                );
                Some(1.0 / min_prob)
            }
            (ProbabilityFloor::Exclude, _) if prob <= 0.0 => {
                log::debug!("censoring probability vanished at time {weight_time}; excluded");
                None
            }
            _ => Some(1.0 / prob),
        }
    }

    /// Censoring weight of `observation` at `eval_time`.
    ///
    /// Returns `Ok(None)` when the observation is unusable at `eval_time`, either
    /// because it was censored by then or because the floor policy excluded it.
    pub fn censoring_weight(
        &self,
        observation: &Observation,
        eval_time: f64,
    ) -> Result<Option<f64>, EvalError> {
        let eval_time = check_time("evaluation time", eval_time)?;
        let category = Category::classify_checked(observation, eval_time);
        Ok(self.weight_for(category, observation, eval_time))
    }

    pub(crate) fn weight_for(
        &self,
        category: Category,
        observation: &Observation,
        eval_time: f64,
    ) -> Option<f64> {
        category
            .weight_time(observation, eval_time)
            .and_then(|weight_time| self.weight_at(weight_time))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn fit(training: &[Observation], floor: ProbabilityFloor) -> CensoringEstimator {
        CensoringEstimator::fit(training, &EstimatorConfig { floor }).unwrap()
    }

    fn sample() -> Vec<Observation> {
        vec![
            Observation::event(1.0).unwrap(),
            Observation::censored(2.0).unwrap(),
            Observation::event(3.0).unwrap(),
            Observation::censored(4.0).unwrap(),
        ]
    }

    #[test]
    fn test_empty_sample_is_constant() {
        let estimator = fit(&[], ProbabilityFloor::default());
        assert!(estimator.is_degenerate());
        assert_eq!(estimator.n_observations(), 0);
        assert_eq!(estimator.max_time(), None);
        assert_eq!(estimator.weight_at(100.0), Some(1.0));
    }

    #[test]
    fn test_no_censoring_is_constant() {
        let training = [
            Observation::event(1.0).unwrap(),
            Observation::event(2.0).unwrap(),
        ];
        let estimator = fit(&training, ProbabilityFloor::Exclude);
        assert!(estimator.is_degenerate());
        for t in [0.0, 1.0, 1.5, 2.0, 50.0] {
            assert_eq!(estimator.probability_uncensored_before(t), 1.0);
            assert_eq!(estimator.probability_censored_by(t), 0.0);
            assert_eq!(estimator.weight_at(t), Some(1.0));
        }
    }

    #[test]
    fn test_reverse_curve_values() {
        let estimator = fit(&sample(), ProbabilityFloor::Exclude);
        assert_eq!(estimator.n_censored(), 2);
        // 3 at risk at time 2, 1 at risk at time 4
        assert_relative_eq!(estimator.probability_censored_by(2.0), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(estimator.probability_censored_by(4.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_uses_left_limit() {
        let estimator = fit(&sample(), ProbabilityFloor::Exclude);
        // Censoring at exactly 2.0 is not yet counted at 2.0
        assert_eq!(estimator.weight_at(2.0), Some(1.0));
        assert_relative_eq!(estimator.weight_at(2.5).unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(estimator.weight_at(4.0).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_exclude_when_probability_vanishes() {
        let estimator = fit(&sample(), ProbabilityFloor::Exclude);
        assert_eq!(estimator.weight_at(4.5), None);
        let obs = Observation::event(9.0).unwrap();
        assert_eq!(estimator.censoring_weight(&obs, 5.0).unwrap(), None);
    }

    #[test]
    fn test_truncate_caps_weight() {
        let estimator = fit(&sample(), ProbabilityFloor::Truncate { trunc: 0.01 });
        // Smallest positive G is 2/3, so the floor is min(0.01, 1/3) = 0.01
        assert_relative_eq!(estimator.weight_at(4.5).unwrap(), 100.0, epsilon = 1e-9);

        let estimator = fit(&sample(), ProbabilityFloor::Truncate { trunc: 1.0 });
        // Floor is min(1.0, 1/3)
        assert_relative_eq!(estimator.weight_at(4.5).unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_truncation() {
        for trunc in [0.0, -0.1, 1.5, f64::NAN] {
            let config = EstimatorConfig {
                floor: ProbabilityFloor::Truncate { trunc },
            };
            assert!(matches!(
                CensoringEstimator::fit(&sample(), &config),
                Err(EvalError::InvalidTruncation { .. })
            ));
        }
    }

    #[test]
    fn test_censoring_weight_by_category() {
        let estimator = fit(&sample(), ProbabilityFloor::Exclude);
        let event = Observation::event(3.0).unwrap();
        let censored = Observation::censored(2.0).unwrap();

        // Event at 3.0 weighted at its own time
        assert_relative_eq!(
            estimator.censoring_weight(&event, 3.5).unwrap().unwrap(),
            1.5,
            epsilon = 1e-12
        );
        // Still event-free at 1.0: weighted at the evaluation time
        assert_eq!(estimator.censoring_weight(&censored, 1.0).unwrap(), Some(1.0));
        // Censored before 3.0: unusable
        assert_eq!(estimator.censoring_weight(&censored, 3.0).unwrap(), None);
        assert!(estimator.censoring_weight(&event, -1.0).is_err());
    }

    #[test]
    fn test_median_follow_up() {
        let estimator = fit(&sample(), ProbabilityFloor::Exclude);
        // Reverse curve: 2/3 at 2.0, 0 at 4.0
        let median = estimator.median_follow_up().unwrap();
        assert_relative_eq!(median, 2.5, epsilon = 1e-12);
    }

    fn saved_model(curve: &str, floor: &str, min_prob: &str) -> String {
        format!(
            r#"{{"curve":{curve},"floor":{floor},"min_prob":{min_prob},"n_observations":4,"n_censored":2,"max_time":4.0}}"#
        )
    }

    const CURVE: &str = r#"{"times":[2.0,4.0],"survival_prob":[0.5,0.0],"at_risk":[3,1],"events":[1,1]}"#;
    const TRUNCATE: &str = r#"{"policy":"truncate","trunc":0.01}"#;
    const EXCLUDE: &str = r#"{"policy":"exclude"}"#;

    #[test]
    fn test_load_valid_model() {
        let json = saved_model(CURVE, TRUNCATE, "0.01");
        let estimator: CensoringEstimator = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(estimator.weight_at(5.0).unwrap(), 100.0, epsilon = 1e-9);

        let json = saved_model(CURVE, EXCLUDE, "null");
        let estimator: CensoringEstimator = serde_json::from_str(&json).unwrap();
        assert_eq!(estimator.weight_at(5.0), None);
    }

    #[test]
    fn test_load_rejects_inconsistent_models() {
        let bad = [
            // Truncation without a resolved floor would divide by zero
            saved_model(CURVE, TRUNCATE, "null"),
            saved_model(CURVE, TRUNCATE, "0.0"),
            saved_model(CURVE, TRUNCATE, "0.5"),
            saved_model(CURVE, r#"{"policy":"truncate","trunc":2.0}"#, "0.01"),
            saved_model(CURVE, EXCLUDE, "0.01"),
            saved_model(
                r#"{"times":[2.0],"survival_prob":[-0.5],"at_risk":[3],"events":[1]}"#,
                TRUNCATE,
                "0.01",
            ),
            saved_model(
                r#"{"times":[2.0,4.0],"survival_prob":[0.25,0.5],"at_risk":[3,1],"events":[1,1]}"#,
                TRUNCATE,
                "0.01",
            ),
            saved_model(
                r#"{"times":[4.0,2.0],"survival_prob":[0.5,0.25],"at_risk":[3,1],"events":[1,1]}"#,
                TRUNCATE,
                "0.01",
            ),
            saved_model(
                r#"{"times":[2.0,4.0],"survival_prob":[0.5],"at_risk":[3,1],"events":[1,1]}"#,
                TRUNCATE,
                "0.01",
            ),
        ];
        for json in &bad {
            assert!(
                serde_json::from_str::<CensoringEstimator>(json).is_err(),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let estimator = fit(&sample(), ProbabilityFloor::default());
        let json = serde_json::to_string(&estimator).unwrap();
        let restored: CensoringEstimator = serde_json::from_str(&json).unwrap();
        assert_eq!(estimator, restored);
    }
}

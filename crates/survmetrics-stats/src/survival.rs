use serde::{Deserialize, Serialize};

/// Kaplan-Meier survival curve for survival analysis.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the study period).
///
/// The same estimator with the roles of "event" and "censored" swapped (see
/// [`KaplanMeierCurve::from_data_reversed`]) estimates the distribution of censoring times,
/// which is what inverse-probability-of-censoring weighting needs.
///
/// # Fields
///
/// The curve stores parallel vectors representing a right-continuous step function. Each
/// entry is a jump point:
/// - Time points where the counted outcome occurred
/// - Survival probability at (and after) each time point
/// - Number of subjects at risk at each time point
/// - Number of counted outcomes at each time point
///
/// A curve without jump points is the constant function `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KaplanMeierCurve {
    /// Time points where the counted outcome occurred, strictly increasing.
    pub times: Vec<f64>,
    /// Survival probability at each corresponding time point.
    /// Values range from 0.0 (no survival) to 1.0 (complete survival).
    pub survival_prob: Vec<f64>,
    /// Number of subjects at risk (observed time at or after the time point).
    pub at_risk: Vec<usize>,
    /// Number of counted outcomes that occurred at each time point.
    pub events: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve from survival data.
    ///
    /// # Arguments
    ///
    /// * `data` - A vector of tuples where each tuple contains:
    ///   - `time`: The time at which the observation occurred
    ///   - `is_censored`: `true` if the observation was censored (event did not occur),
    ///     `false` if the event occurred
    ///
    /// # Panics
    ///
    /// Panics if any time is not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survmetrics_stats::survival::KaplanMeierCurve;
    /// // Data: (time, is_censored)
    /// let data = vec![
    ///     (10.0, false), // Event at time 10
    ///     (20.0, true),  // Censored at time 20
    ///     (30.0, false), // Event at time 30
    /// ];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// assert_eq!(curve.times, vec![10.0, 30.0]);
    /// ```
    #[must_use]
    pub fn from_data(data: Vec<(f64, bool)>) -> Self {
        Self::from_outcomes(
            data.into_iter()
                .map(|(time, is_censored)| (time, !is_censored))
                .collect(),
        )
    }

    /// Computes the reverse Kaplan-Meier curve, the estimated probability of
    /// not yet being censored.
    ///
    /// Takes the same `(time, is_censored)` tuples as [`KaplanMeierCurve::from_data`], but
    /// counts censored observations as the outcome and treats events as censoring.
    /// Every observation with `time >= u` is at risk at `u`, so events tied with
    /// censorings stay in the risk set.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survmetrics_stats::survival::KaplanMeierCurve;
    /// let data = vec![(1.0, false), (2.0, true), (3.0, false), (4.0, true)];
    /// let curve = KaplanMeierCurve::from_data_reversed(data);
    ///
    /// assert_eq!(curve.times, vec![2.0, 4.0]);
    /// assert!((curve.survival_at(2.0) - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(curve.survival_at(4.0), 0.0);
    /// ```
    #[must_use]
    pub fn from_data_reversed(data: Vec<(f64, bool)>) -> Self {
        Self::from_outcomes(data)
    }

    /// Builds the step function from `(time, counted)` pairs.
    #[expect(clippy::cast_precision_loss)]
    fn from_outcomes(mut data: Vec<(f64, bool)>) -> Self {
        assert!(
            data.iter().all(|(time, _)| time.is_finite()),
            "survival times must be finite"
        );
        if data.is_empty() {
            return Self::default();
        }

        // Sort by time
        data.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut times = vec![];
        let mut survival_prob = vec![];
        let mut at_risk_vec = vec![];
        let mut events_vec = vec![];

        let mut current_survival = 1.0;
        let total = data.len();

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].0;
            let at_risk = total - i;

            // Count outcomes at this time point
            let mut event_count = 0;
            let mut j = i;
            while j < data.len() && data[j].0 == current_time {
                if data[j].1 {
                    event_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                let survival_rate = 1.0 - (event_count as f64 / at_risk as f64);
                current_survival *= survival_rate;

                times.push(current_time);
                survival_prob.push(current_survival);
                at_risk_vec.push(at_risk);
                events_vec.push(event_count);
            }

            i = j;
        }

        Self {
            times,
            survival_prob,
            at_risk: at_risk_vec,
            events: events_vec,
        }
    }

    /// Returns `true` if the curve has no jump points (constant `1.0`).
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the time at which the survival probability
    /// drops to or below 50%. If the survival probability never reaches 50%,
    /// this method returns `None`.
    ///
    /// Linear interpolation is used between time points for more accurate estimates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survmetrics_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false), (30.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// let median = curve.median_survival().unwrap();
    /// assert!((median - 15.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&p| p <= 0.5)?;
        if i == 0 {
            return Some(self.times[0]);
        }
        // Linear interpolation between points
        let t0 = self.times[i - 1];
        let t1 = self.times[i];
        let s0 = self.survival_prob[i - 1];
        let s1 = self.survival_prob[i];
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Returns the survival probability at a specific time.
    ///
    /// The curve is right-continuous: a jump at `time` is already included.
    /// Returns `1.0` before the first jump and the last probability after the last one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survmetrics_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0);  // Before first event
    /// assert_eq!(curve.survival_at(10.0), 0.5); // Jump included
    /// assert_eq!(curve.survival_at(15.0), 0.5);
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        let idx = self.times.partition_point(|&t| t <= time);
        self.prob_before_index(idx)
    }

    /// Returns the left limit of the survival probability at `time`.
    ///
    /// Only jumps strictly before `time` are included, which is the same as
    /// querying at `time - ε` for an infinitesimal `ε`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survmetrics_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    ///
    /// assert_eq!(curve.survival_before(10.0), 1.0);
    /// assert_eq!(curve.survival_before(10.5), 0.5);
    /// ```
    #[must_use]
    pub fn survival_before(&self, time: f64) -> f64 {
        let idx = self.times.partition_point(|&t| t < time);
        self.prob_before_index(idx)
    }

    fn prob_before_index(&self, idx: usize) -> f64 {
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }

    /// Returns the smallest strictly positive survival probability on the curve.
    #[must_use]
    pub fn min_positive_prob(&self) -> Option<f64> {
        self.survival_prob
            .iter()
            .copied()
            .filter(|&p| p > 0.0)
            .min_by(f64::total_cmp)
    }

    /// Returns the time of the last jump, if any.
    #[must_use]
    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survmetrics_eval::{frame::PredictedSurvival, observation::Observation};

/// Evaluation dataset: a training sample for the censoring model and a test
/// sample with predicted survival probabilities.
///
/// ```json
/// {
///   "eval_times": [5.0, 10.0],
///   "training": [{ "time": 4.83, "status": "event" }],
///   "testing": [
///     {
///       "time": 6.60,
///       "status": "censored",
///       "predictions": [
///         { "eval_time": 5.0, "survival": 0.71 },
///         { "eval_time": 10.0, "survival": 0.42 }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// How the dataset was produced, when it was simulated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationInfo>,
    /// Evaluation times the predictions were made at
    pub eval_times: Vec<f64>,
    /// Sample used to fit the censoring distribution
    pub training: Vec<Observation>,
    /// Sample the metrics are computed on
    pub testing: Vec<TestRecord>,
}

impl Dataset {
    pub fn test_observations(&self) -> Vec<Observation> {
        self.testing.iter().map(|record| record.observation).collect()
    }
}

/// A test observation with its predicted survival curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(flatten)]
    pub observation: Observation,
    pub predictions: Vec<PredictedSurvival>,
}

impl AsRef<[PredictedSurvival]> for TestRecord {
    fn as_ref(&self) -> &[PredictedSurvival] {
        &self.predictions
    }
}

/// Parameters of a simulated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub base_rate: f64,
    pub beta: f64,
    pub censoring_rate: f64,
    pub max_follow_up: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset() {
        let json = r#"{
            "eval_times": [5.0],
            "training": [{ "time": 4.83, "status": "event" }],
            "testing": [
                {
                    "time": 6.6,
                    "status": "censored",
                    "predictions": [{ "eval_time": 5.0, "survival": 0.71 }]
                }
            ]
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert!(dataset.simulation.is_none());
        assert_eq!(dataset.training, vec![Observation::event(4.83).unwrap()]);
        assert_eq!(
            dataset.test_observations(),
            vec![Observation::censored(6.6).unwrap()]
        );
        assert_eq!(dataset.testing[0].as_ref()[0].survival, 0.71);
    }

    #[test]
    fn test_reject_invalid_rows() {
        let json = r#"{
            "eval_times": [5.0],
            "training": [{ "time": -1.0, "status": "event" }],
            "testing": []
        }"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());

        let json = r#"{
            "eval_times": [5.0],
            "training": [{ "time": 1.0, "status": "dead" }],
            "testing": []
        }"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }
}

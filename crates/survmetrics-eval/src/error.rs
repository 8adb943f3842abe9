/// Errors reported for malformed evaluation input.
///
/// Only input-domain problems are errors. Degenerate but well-formed situations
/// (no censoring in the training data, no usable rows at an evaluation time,
/// zero denominators) are reported through documented sentinel values instead.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvalError {
    #[display("{what} must not be negative, got {value}")]
    NegativeTime { what: &'static str, value: f64 },
    #[display("{what} must be finite, got {value}")]
    NonFiniteTime { what: &'static str, value: f64 },
    #[display("unknown status '{status}', expected 'event' or 'censored'")]
    UnknownStatus { status: String },
    #[display(
        "predicted survival for observation #{observation} at time {eval_time} must be in [0, 1], got {value}"
    )]
    InvalidSurvivalProbability {
        observation: usize,
        eval_time: f64,
        value: f64,
    },
    #[display("got predictions for {predictions} observations, expected {observations}")]
    PredictionCountMismatch {
        observations: usize,
        predictions: usize,
    },
    #[display("observation #{observation} has no prediction at evaluation time {eval_time}")]
    MissingPrediction { observation: usize, eval_time: f64 },
    #[display("at least one evaluation time is required")]
    EmptyEvaluationTimes,
    #[display("classification threshold must be in [0, 1], got {value}")]
    InvalidThreshold { value: f64 },
    #[display("probability truncation must be in (0, 1], got {value}")]
    InvalidTruncation { value: f64 },
    #[display("invalid censoring model: {reason}")]
    InvalidCensoringModel { reason: &'static str },
}

/// Checks that a time value is finite and non-negative.
pub(crate) fn check_time(what: &'static str, value: f64) -> Result<f64, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFiniteTime { what, value });
    }
    if value < 0.0 {
        return Err(EvalError::NegativeTime { what, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_time() {
        assert_eq!(check_time("t", 0.0), Ok(0.0));
        assert_eq!(check_time("t", 2.5), Ok(2.5));
        assert_eq!(
            check_time("t", -1.0),
            Err(EvalError::NegativeTime {
                what: "t",
                value: -1.0
            })
        );
        assert!(matches!(
            check_time("t", f64::NAN),
            Err(EvalError::NonFiniteTime { .. })
        ));
        assert!(matches!(
            check_time("t", f64::INFINITY),
            Err(EvalError::NonFiniteTime { .. })
        ));
    }

    #[test]
    fn test_display_messages() {
        let err = EvalError::NegativeTime {
            what: "evaluation time",
            value: -2.0,
        };
        assert_eq!(err.to_string(), "evaluation time must not be negative, got -2");
        let err = EvalError::UnknownStatus {
            status: "dead".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unknown status 'dead', expected 'event' or 'censored'"
        );
    }
}

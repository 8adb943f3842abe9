//! Right-censored observations
//!
//! An [`Observation`] is one subject's observed time together with whether the
//! event of interest was seen at that time ([`Status::Event`]) or observation
//! stopped before it happened ([`Status::Censored`]).
//!
//! ```text
//! Event:     |----x      (event observed at time y)
//! Censored:  |------>    (still event-free when follow-up ended at y)
//! ```
//!
//! Observations are validated on construction and on deserialization: the
//! time must be finite and non-negative, and the status must be one of the two
//! recognized words.
//!
//! # Serialization
//!
//! ```json
//! { "time": 4.83, "status": "event" }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, check_time};

/// Whether the event was observed at the recorded time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The event of interest occurred at the observed time.
    #[display("event")]
    Event,
    /// Observation ended at the observed time without the event.
    #[display("censored")]
    Censored,
}

impl FromStr for Status {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("event") {
            Ok(Self::Event)
        } else if s.eq_ignore_ascii_case("censored") {
            Ok(Self::Censored)
        } else {
            Err(EvalError::UnknownStatus {
                status: s.to_owned(),
            })
        }
    }
}

/// One subject's observed time and status.
///
/// # Examples
///
/// ```
/// use survmetrics_eval::observation::{Observation, Status};
///
/// let obs = Observation::new(4.83, Status::Event).unwrap();
/// assert_eq!(obs.time(), 4.83);
/// assert!(obs.status().is_event());
///
/// assert!(Observation::censored(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservation")]
pub struct Observation {
    time: f64,
    status: Status,
}

#[derive(Deserialize)]
struct RawObservation {
    time: f64,
    status: Status,
}

impl TryFrom<RawObservation> for Observation {
    type Error = EvalError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        Self::new(raw.time, raw.status)
    }
}

impl Observation {
    /// Creates an observation, rejecting negative or non-finite times.
    pub fn new(time: f64, status: Status) -> Result<Self, EvalError> {
        let time = check_time("observed time", time)?;
        Ok(Self { time, status })
    }

    /// Creates an observation whose event happened at `time`.
    pub fn event(time: f64) -> Result<Self, EvalError> {
        Self::new(time, Status::Event)
    }

    /// Creates an observation censored at `time`.
    pub fn censored(time: f64) -> Result<Self, EvalError> {
        Self::new(time, Status::Censored)
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn is_censored(&self) -> bool {
        self.status.is_censored()
    }
}

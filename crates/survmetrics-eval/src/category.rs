//! Binary outcome encoding at an evaluation time
//!
//! Time-dependent classification metrics need a binary truth at each evaluation
//! time `t`. Following Graf et al., each observation falls into exactly one of
//! three categories:
//!
//! | status     | observed time | category    |
//! |------------|---------------|-------------|
//! | `event`    | `y <= t`      | `Event`     |
//! | any        | `y > t`       | `NonEvent`  |
//! | `censored` | `y <= t`      | `Unusable`  |
//!
//! At `y == t` an event is already an `Event`, while a censoring is already
//! `Unusable`. Unusable observations carry no information about the outcome at
//! `t` and are left out of every metric for that time.

use serde::{Deserialize, Serialize};

use crate::{
    error::{EvalError, check_time},
    observation::{Observation, Status},
};

/// Outcome of one observation at one evaluation time.
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
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// The event has already happened by the evaluation time.
    #[display("event")]
    Event,
    /// Nothing has happened yet at the evaluation time.
    #[display("non-event")]
    NonEvent,
    /// Censored before the evaluation time; the outcome is unknown.
    #[display("unusable")]
    Unusable,
}

impl Category {
    /// Classifies `observation` at `eval_time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use survmetrics_eval::{category::Category, observation::Observation};
    ///
    /// let event = Observation::event(5.0).unwrap();
    /// let censored = Observation::censored(3.0).unwrap();
    ///
    /// assert_eq!(Category::classify(&event, 4.0).unwrap(), Category::NonEvent);
    /// assert_eq!(Category::classify(&event, 5.0).unwrap(), Category::Event);
    /// assert_eq!(Category::classify(&censored, 3.0).unwrap(), Category::Unusable);
    /// ```
    pub fn classify(observation: &Observation, eval_time: f64) -> Result<Self, EvalError> {
        let eval_time = check_time("evaluation time", eval_time)?;
        Ok(Self::classify_checked(observation, eval_time))
    }

    /// Classifies with an already validated evaluation time.
    pub(crate) fn classify_checked(observation: &Observation, eval_time: f64) -> Self {
        let time = observation.time();
        match observation.status() {
            Status::Event if time <= eval_time => Self::Event,
            _ if time > eval_time => Self::NonEvent,
            _ => Self::Unusable,
        }
    }

    /// Returns the time at which the censoring distribution is queried for
    /// this category's weight.
    ///
    /// Events are weighted at their own observed time, non-events at the
    /// evaluation time. Unusable observations get no weight.
    #[must_use]
    pub fn weight_time(self, observation: &Observation, eval_time: f64) -> Option<f64> {
        match self {
            Self::Event => Some(observation.time()),
            Self::NonEvent => Some(eval_time),
            Self::Unusable => None,
        }
    }
}

/// Number of observations in each category at one evaluation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub event: usize,
    pub non_event: usize,
    pub unusable: usize,
}

impl CategoryCounts {
    /// Tallies categories.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut counts = Self::default();
        for category in categories {
            match category {
                Category::Event => counts.event += 1,
                Category::NonEvent => counts.non_event += 1,
                Category::Unusable => counts.unusable += 1,
            }
        }
        counts
    }

    /// Number of observations that take part in metrics.
    #[must_use]
    pub fn usable(&self) -> usize {
        self.event + self.non_event
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.usable() + self.unusable
    }
}

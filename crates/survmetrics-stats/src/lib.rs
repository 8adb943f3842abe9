//! Statistical primitives for censoring-aware survival metrics.
//!
//! This crate provides the numerical building blocks used by `survmetrics-eval`:
//!
//! - **Survival curves**: Kaplan-Meier estimator for time-to-event data with censoring,
//!   in standard and reversed (censoring-distribution) form
//! - **Integration**: Trapezoidal area under metrics sampled over time
//! - **Descriptive statistics**: Summaries of weight distributions
//!
//! # Modules
//!
//! - [`survival`]: Kaplan-Meier step curves and their point queries
//! - [`integrate`]: Trapezoidal-rule integration of sampled curves
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Estimating the censoring distribution
//!
//! ```
//! use survmetrics_stats::survival::KaplanMeierCurve;
//!
//! // Data: (time, is_censored)
//! let data = vec![
//!     (10.0, false), // Event occurred at time 10
//!     (20.0, true),  // Censored at time 20
//!     (30.0, false), // Event occurred at time 30
//! ];
//! let censoring = KaplanMeierCurve::from_data_reversed(data);
//!
//! // Probability of not yet being censored, just before time 20
//! assert_eq!(censoring.survival_before(20.0), 1.0);
//! assert_eq!(censoring.survival_at(20.0), 0.5);
//! ```
//!
//! ## Integrating a metric over time
//!
//! ```
//! use survmetrics_stats::integrate::trapezoid;
//!
//! let brier = [(1.0, 0.1), (2.0, 0.2), (3.0, 0.2)];
//! let area = trapezoid(&brier);
//! assert!((area - 0.35).abs() < 1e-12);
//! ```

pub mod descriptive;
pub mod integrate;
pub mod survival;

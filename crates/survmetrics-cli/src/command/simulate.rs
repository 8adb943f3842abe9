//! Synthetic dataset generation
//!
//! Subjects have one covariate `x ~ N(0, 1)` and an exponential event time with
//! rate `base_rate * exp(beta * x)`. Follow-up ends at an independent
//! exponential censoring time, or at `max_follow_up` if that comes first.
//!
//! Test rows carry the true model's survival `exp(-rate * t)` as predictions,
//! so metrics on a simulated dataset show how a correctly specified model
//! scores under the chosen amount of censoring.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use rand_pcg::Pcg64;
use survmetrics_eval::{
    frame::{PredictedSurvival, normalize_eval_times},
    observation::Observation,
};

use crate::{
    model::dataset::{Dataset, SimulationInfo, TestRecord},
    util::JsonWriter,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of training observations
    #[arg(long, default_value_t = 500)]
    n_train: usize,
    /// Number of test observations
    #[arg(long, default_value_t = 200)]
    n_test: usize,
    /// Event rate at `x = 0`
    #[arg(long, default_value_t = 0.1)]
    base_rate: f64,
    /// Log hazard ratio per unit of the covariate
    #[arg(long, default_value_t = 0.7)]
    beta: f64,
    /// Rate of the independent censoring process (0 disables it)
    #[arg(long, default_value_t = 0.05)]
    censoring_rate: f64,
    /// Administrative end of follow-up
    #[arg(long)]
    max_follow_up: Option<f64>,
    /// Evaluation times (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [2.5, 5.0, 10.0, 15.0])]
    eval_times: Vec<f64>,
    /// Random seed; drawn from the OS when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

struct Subject {
    rate: f64,
    observation: Observation,
}

struct Simulator {
    base_rate: f64,
    beta: f64,
    covariate: Normal<f64>,
    censoring: Option<Exp<f64>>,
    max_follow_up: Option<f64>,
}

impl Simulator {
    fn new(arg: &SimulateArg) -> anyhow::Result<Self> {
        anyhow::ensure!(
            arg.base_rate > 0.0 && arg.base_rate.is_finite(),
            "base rate must be positive, got {}",
            arg.base_rate
        );
        anyhow::ensure!(arg.beta.is_finite(), "beta must be finite");
        anyhow::ensure!(
            arg.censoring_rate >= 0.0 && arg.censoring_rate.is_finite(),
            "censoring rate must be non-negative, got {}",
            arg.censoring_rate
        );
        if let Some(max) = arg.max_follow_up {
            anyhow::ensure!(max > 0.0, "maximum follow-up must be positive, got {max}");
        }

        let covariate = Normal::new(0.0, 1.0).context("Failed to build covariate distribution")?;
        let censoring = if arg.censoring_rate > 0.0 {
            Some(Exp::new(arg.censoring_rate).context("Failed to build censoring distribution")?)
        } else {
            None
        };
        Ok(Self {
            base_rate: arg.base_rate,
            beta: arg.beta,
            covariate,
            censoring,
            max_follow_up: arg.max_follow_up,
        })
    }

    fn subject<R>(&self, rng: &mut R) -> anyhow::Result<Subject>
    where
        R: Rng + ?Sized,
    {
        let x = self.covariate.sample(rng);
        let rate = self.base_rate * (self.beta * x).exp();
        let event_time = Exp::new(rate)
            .with_context(|| format!("Invalid event rate {rate}"))?
            .sample(rng);
        let censor_time = [
            self.censoring.as_ref().map(|dist| dist.sample(rng)),
            self.max_follow_up,
        ]
        .into_iter()
        .flatten()
        .min_by(f64::total_cmp);

        let observation = match censor_time {
            Some(censor_time) if censor_time < event_time => Observation::censored(censor_time)?,
            _ => Observation::event(event_time)?,
        };
        Ok(Subject { rate, observation })
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let simulator = Simulator::new(arg)?;
    let eval_times = normalize_eval_times(&arg.eval_times)?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64::seed_from_u64(seed);

    log::info!(
        "Simulating {} training and {} test observations (seed {seed})...",
        arg.n_train,
        arg.n_test
    );

    let training = (0..arg.n_train)
        .map(|_| Ok(simulator.subject(&mut rng)?.observation))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let testing = (0..arg.n_test)
        .map(|_| {
            let subject = simulator.subject(&mut rng)?;
            let predictions = eval_times
                .iter()
                .map(|&eval_time| PredictedSurvival {
                    eval_time,
                    survival: (-subject.rate * eval_time).exp(),
                })
                .collect();
            Ok(TestRecord {
                observation: subject.observation,
                predictions,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let n_censored = training.iter().filter(|obs| obs.is_censored()).count()
        + testing
            .iter()
            .filter(|record| record.observation.is_censored())
            .count();
    log::info!(
        "Generated {} observations, {n_censored} censored",
        training.len() + testing.len()
    );

    let dataset = Dataset {
        simulation: Some(SimulationInfo {
            generated_at: Utc::now(),
            seed,
            base_rate: arg.base_rate,
            beta: arg.beta,
            censoring_rate: arg.censoring_rate,
            max_follow_up: arg.max_follow_up,
        }),
        eval_times,
        training,
        testing,
    };

    let mut output = JsonWriter::create(arg.output.as_deref())?;
    output.write(&dataset)?;
    log::info!("Dataset saved to {}", output.destination());

    Ok(())
}

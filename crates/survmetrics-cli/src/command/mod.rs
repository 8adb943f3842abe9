use clap::{Args, Parser, Subcommand, ValueEnum};
use survmetrics_eval::censoring::{DEFAULT_TRUNCATION, EstimatorConfig, ProbabilityFloor};

use self::{
    analyze_censoring::AnalyzeCensoringArg, evaluate::EvaluateArg, simulate::SimulateArg,
};

mod analyze_censoring;
mod evaluate;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate a synthetic survival dataset with known predictions
    Simulate(#[clap(flatten)] SimulateArg),
    /// Analyze censoring in the training sample of a dataset
    AnalyzeCensoring(#[clap(flatten)] AnalyzeCensoringArg),
    /// Compute censoring-weighted metrics on the test sample of a dataset
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::AnalyzeCensoring(arg) => analyze_censoring::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FloorPolicy {
    /// Raise vanishing censoring probabilities to a floor
    #[default]
    Truncate,
    /// Drop observations whose censoring probability vanished
    Exclude,
}

/// Censoring model options shared by subcommands
#[derive(Debug, Clone, Args)]
struct CensoringArg {
    /// How to handle vanishing censoring probabilities
    #[arg(long, value_enum, default_value_t = FloorPolicy::Truncate)]
    floor: FloorPolicy,

    /// Truncation level for the `truncate` policy
    #[arg(long, default_value_t = DEFAULT_TRUNCATION)]
    trunc: f64,
}

impl CensoringArg {
    fn config(&self) -> EstimatorConfig {
        let floor = match self.floor {
            FloorPolicy::Truncate => ProbabilityFloor::Truncate { trunc: self.trunc },
            FloorPolicy::Exclude => ProbabilityFloor::Exclude,
        };
        EstimatorConfig { floor }
    }
}

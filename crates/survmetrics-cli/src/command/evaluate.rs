use std::path::PathBuf;

use chrono::Utc;
use clap::ValueEnum;
use survmetrics_eval::{
    aggregate_metrics,
    censoring::CensoringEstimator,
    fit_censoring_estimator,
    frame::normalize_eval_times,
    metric::{DEFAULT_THRESHOLD, MetricKind, MetricResult, MetricValue},
};

use crate::{
    command::CensoringArg,
    model::report::{CensoringSummary, EvaluationReport},
    util::{self, JsonWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricName {
    BrierScore,
    RocAuc,
    ConfusionMatrix,
    Sensitivity,
    Specificity,
    Precision,
    MissRate,
    FallOut,
    Accuracy,
}

impl MetricName {
    fn kind(self, threshold: f64) -> MetricKind {
        match self {
            MetricName::BrierScore => MetricKind::BrierScore,
            MetricName::RocAuc => MetricKind::RocAuc,
            MetricName::ConfusionMatrix => MetricKind::ConfusionMatrix { threshold },
            MetricName::Sensitivity => MetricKind::Sensitivity { threshold },
            MetricName::Specificity => MetricKind::Specificity { threshold },
            MetricName::Precision => MetricKind::Precision { threshold },
            MetricName::MissRate => MetricKind::MissRate { threshold },
            MetricName::FallOut => MetricKind::FallOut { threshold },
            MetricName::Accuracy => MetricKind::Accuracy { threshold },
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the dataset JSON file
    dataset: PathBuf,

    /// Metrics to compute (comma-separated)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [MetricName::BrierScore, MetricName::RocAuc]
    )]
    metrics: Vec<MetricName>,

    /// Survival probability at or above which a non-event is predicted
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Evaluation times (comma-separated); defaults to the dataset's times
    #[arg(long, value_delimiter = ',')]
    eval_times: Option<Vec<f64>>,

    /// Load a saved censoring model instead of fitting one on the training rows
    ///
    /// The saved model keeps its own floor policy, so `--floor` and `--trunc`
    /// cannot be combined with it.
    #[arg(long, conflicts_with_all = ["floor", "trunc"])]
    censoring_model: Option<PathBuf>,

    #[clap(flatten)]
    censoring: CensoringArg,

    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let eval_times = arg
        .eval_times
        .clone()
        .unwrap_or_else(|| dataset.eval_times.clone());

    let estimator = match &arg.censoring_model {
        Some(path) => {
            log::info!("Loading censoring model from {}...", path.display());
            util::read_censoring_model_file(path)?
        }
        None => {
            log::info!(
                "Fitting censoring model on {} training observations...",
                dataset.training.len()
            );
            fit_censoring_estimator(&dataset.training, &arg.censoring.config())?
        }
    };
    log_estimator(&estimator);

    let kinds = arg
        .metrics
        .iter()
        .map(|name| name.kind(arg.threshold))
        .collect::<Vec<_>>();
    log::info!(
        "Computing {} metrics on {} test observations...",
        kinds.len(),
        dataset.testing.len()
    );
    let metrics = aggregate_metrics(
        &kinds,
        &estimator,
        &dataset.test_observations(),
        &dataset.testing,
        &eval_times,
    )?;
    for result in &metrics {
        log_metric(result);
    }

    let report = EvaluationReport {
        evaluated_at: Utc::now(),
        dataset: arg.dataset.clone(),
        n_training: dataset.training.len(),
        n_testing: dataset.testing.len(),
        eval_times: normalize_eval_times(&eval_times)?,
        censoring: CensoringSummary::new(&estimator, arg.censoring_model.clone()),
        metrics,
    };

    let mut output = JsonWriter::create(arg.output.as_deref())?;
    output.write(&report)?;
    log::info!("Report saved to {}", output.destination());

    Ok(())
}

fn log_estimator(estimator: &CensoringEstimator) {
    log::info!(
        "Censoring model: {}/{} censored, median follow-up {}",
        estimator.n_censored(),
        estimator.n_observations(),
        estimator
            .median_follow_up()
            .map_or("N/A".to_string(), |m| format!("{m:.3}")),
    );
}

fn log_metric(result: &MetricResult) {
    let values = result
        .per_time
        .iter()
        .map(|entry| {
            let value = match entry.value {
                MetricValue::Scalar(Some(value)) => format!("{value:.4}"),
                MetricValue::Scalar(None) => "N/A".to_string(),
                MetricValue::Table(table) => format!(
                    "TP={:.1} FP={:.1} FN={:.1} TN={:.1}",
                    table.true_positive,
                    table.false_positive,
                    table.false_negative,
                    table.true_negative
                ),
            };
            format!("t={}: {value}", entry.eval_time)
        })
        .collect::<Vec<_>>()
        .join(", ");
    match result.integrated {
        Some(integrated) => log::info!(
            "  {:<18} {values} (integrated {integrated:.4})",
            result.metric.name()
        ),
        None => log::info!("  {:<18} {values}", result.metric.name()),
    }
}

//! Censoring analysis command
//!
//! Fits the reverse Kaplan-Meier censoring model on the training rows of a
//! dataset and reports how censoring shapes the usable test sample at each
//! evaluation time.

mod table;

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use survmetrics_eval::{
    category::{Category, CategoryCounts},
    censoring::CensoringEstimator,
    fit_censoring_estimator,
    frame::normalize_eval_times,
    observation::Observation,
};
use survmetrics_stats::{descriptive::DescriptiveStats, survival::KaplanMeierCurve};

use self::table::CategoryTableRow;
use crate::{
    command::CensoringArg,
    util,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeCensoringArg {
    /// Path to the dataset JSON file
    dataset: PathBuf,

    /// Evaluation times (comma-separated); defaults to the dataset's times
    #[arg(long, value_delimiter = ',')]
    eval_times: Option<Vec<f64>>,

    #[clap(flatten)]
    censoring: CensoringArg,

    /// Maximum number of curve rows to print
    #[arg(long, default_value_t = 20)]
    curve_rows: usize,

    /// Save the censoring curve as CSV to this path
    #[arg(long)]
    curve_output: Option<PathBuf>,

    /// Save the fitted censoring model as JSON to this path
    #[arg(long)]
    model_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeCensoringArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let eval_times = normalize_eval_times(arg.eval_times.as_deref().unwrap_or(&dataset.eval_times))?;

    log::info!(
        "Fitting censoring model on {} training observations...",
        dataset.training.len()
    );
    let estimator = fit_censoring_estimator(&dataset.training, &arg.censoring.config())?;

    println!("Censoring Analysis Report");
    println!("=========================\n");

    table::print_legend();
    println!();

    print_overall(&dataset.training, &estimator);
    println!();

    println!("Censoring Survival Curve");
    table::print_curve_table(estimator.curve(), arg.curve_rows);
    println!();

    let test_observations = dataset.test_observations();
    let rows = category_rows(&estimator, &test_observations, &eval_times)?;
    println!(
        "Test Sample by Evaluation Time ({} observations)",
        test_observations.len()
    );
    table::print_category_table(&rows);

    if let Some(path) = &arg.curve_output {
        save_curve_csv(path, estimator.curve())?;
        println!("\nCensoring curve saved to: {}", path.display());
    }

    if let Some(path) = &arg.model_output {
        util::save_json(&estimator, path)?;
        println!("\nCensoring model saved to: {}", path.display());
    }

    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn print_overall(training: &[Observation], estimator: &CensoringEstimator) {
    let total = training.len();
    let censored = estimator.n_censored();
    let events = total - censored;
    let percent = |count: usize| {
        if total == 0 {
            0.0
        } else {
            100.0 * count as f64 / total as f64
        }
    };

    println!("Training Sample:");
    println!(
        "  Observations: {} total, {} events ({:.1}%), {} censored ({:.1}%)",
        total,
        events,
        percent(events),
        censored,
        percent(censored)
    );
    if let Some(time_stats) = DescriptiveStats::new(training.iter().map(Observation::time)) {
        println!(
            "  Observed time: min {:.3}, median {:.3}, max {:.3}",
            time_stats.min, time_stats.median, time_stats.max
        );
    }
    println!(
        "  Median follow-up (reverse KM): {}",
        estimator
            .median_follow_up()
            .map_or("N/A".to_string(), |m| format!("{m:.3}"))
    );
    println!("  Probability floor: {:?}", estimator.floor());
    if estimator.is_degenerate() {
        println!("  No censored observations: every censoring weight is 1");
    }
}

fn category_rows(
    estimator: &CensoringEstimator,
    observations: &[Observation],
    eval_times: &[f64],
) -> anyhow::Result<Vec<CategoryTableRow>> {
    eval_times
        .iter()
        .map(|&eval_time| {
            let mut categories = Vec::with_capacity(observations.len());
            let mut weights = Vec::new();
            let mut excluded = 0;
            for obs in observations {
                let category = Category::classify(obs, eval_time)?;
                match estimator.censoring_weight(obs, eval_time)? {
                    Some(weight) => weights.push(weight),
                    None if !category.is_unusable() => excluded += 1,
                    None => {}
                }
                categories.push(category);
            }
            Ok(CategoryTableRow {
                eval_time,
                counts: CategoryCounts::from_categories(categories),
                excluded,
                weights: DescriptiveStats::new(weights),
            })
        })
        .collect()
}

fn save_curve_csv(path: &Path, curve: &KaplanMeierCurve) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let mut csv_content = String::from("time,survival_prob,at_risk,censored\n");
    for i in 0..curve.times.len() {
        writeln!(
            &mut csv_content,
            "{},{},{},{}",
            curve.times[i], curve.survival_prob[i], curve.at_risk[i], curve.events[i]
        )
        .with_context(|| format!("Failed to write CSV row for time {}", curve.times[i]))?;
    }

    fs::write(path, csv_content)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

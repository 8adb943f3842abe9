//! Censoring report table display
//!
//! Fixed-width tables for the reverse Kaplan-Meier curve and for category
//! counts per evaluation time.

use survmetrics_eval::category::CategoryCounts;
use survmetrics_stats::{descriptive::DescriptiveStats, survival::KaplanMeierCurve};

/// A row in the per-evaluation-time table
pub(super) struct CategoryTableRow {
    pub eval_time: f64,
    pub counts: CategoryCounts,
    /// Event or non-event rows dropped by the exclude floor policy
    pub excluded: usize,
    /// Summary of the weights of usable rows
    pub weights: Option<DescriptiveStats>,
}

impl CategoryTableRow {
    /// Rows that actually carry a censoring weight
    pub(super) fn usable(&self) -> usize {
        self.counts.usable() - self.excluded
    }

    #[expect(clippy::cast_precision_loss)]
    pub(super) fn usable_rate(&self) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            return 0.0;
        }
        100.0 * self.usable() as f64 / total as f64
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or("N/A".to_string(), |v| format!("{v:.precision$}"))
}

/// Print the curve at up to `max_rows` evenly spaced jump points
pub(super) fn print_curve_table(curve: &KaplanMeierCurve, max_rows: usize) {
    println!(
        "  {:>12} {:>8} {:>10} {:>10}",
        "Time", "AtRisk", "Censored", "G(t)"
    );
    // time(12) + at_risk(8) + censored(10) + g(10) + spaces(3)
    println!("  {}", "-".repeat(43));

    let n = curve.times.len();
    if n == 0 {
        println!("  (no censoring observed: G(t) = 1 everywhere)");
        return;
    }
    let step = n.div_ceil(max_rows.max(1));
    let mut indices = (0..n).step_by(step).collect::<Vec<_>>();
    if indices.last() != Some(&(n - 1)) {
        indices.push(n - 1);
    }
    for i in indices {
        println!(
            "  {:>12.3} {:>8} {:>10} {:>10.4}",
            curve.times[i], curve.at_risk[i], curve.events[i], curve.survival_prob[i]
        );
    }
    if step > 1 {
        println!("  (showing every {step}th of {n} jump points)");
    }
}

/// Print category counts and weight summaries per evaluation time
pub(super) fn print_category_table(rows: &[CategoryTableRow]) {
    println!(
        "  {:>10} {:>8} {:>9} {:>9} {:>9} {:>8} {:>10} {:>10} {:>10}",
        "Time", "Event", "NonEvent", "Unusable", "Excluded", "Usable%", "MinW", "MeanW", "MaxW",
    );
    // time(10) + event(8) + non_event(9) + unusable(9) + excluded(9) + usable%(8) + weights(10 * 3) + spaces(8)
    println!("  {}", "-".repeat(91));

    for row in rows {
        let weights = row.weights.as_ref();
        println!(
            "  {:>10.3} {:>8} {:>9} {:>9} {:>9} {:>7.1}% {:>10} {:>10} {:>10}",
            row.eval_time,
            row.counts.event,
            row.counts.non_event,
            row.counts.unusable,
            row.excluded,
            row.usable_rate(),
            fmt_opt(weights.map(|w| w.min), 3),
            fmt_opt(weights.map(|w| w.mean), 3),
            fmt_opt(weights.map(|w| w.max), 3),
        );
    }
}

/// Print legend explaining table columns
pub(super) fn print_legend() {
    println!("Legend:");
    println!("  G(t)      : Probability of remaining uncensored past t (reverse Kaplan-Meier)");
    println!("  Event     : Event observed at or before the evaluation time");
    println!("  NonEvent  : Still event-free after the evaluation time");
    println!("  Unusable  : Censored at or before the evaluation time (no weight)");
    println!("  Excluded  : Event or NonEvent row whose G(w-) vanished under the exclude policy");
    println!("  MinW/MeanW/MaxW : Censoring weights 1/G(w-) of usable rows");
}

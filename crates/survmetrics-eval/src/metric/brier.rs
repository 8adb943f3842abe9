use survmetrics_stats::integrate::trapezoid;

use crate::frame::EvaluationRow;

/// Censoring-weighted Brier score at one evaluation time.
///
/// Each usable row contributes `weight * (truth - survival)^2`, where `truth` is
/// `1` for a non-event and `0` for an event. The sum is divided by the total
/// number of observations `n_observations`; unusable rows contribute zero.
///
/// Returns `None` when no row is usable.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn brier_score(rows: &[EvaluationRow], n_observations: usize) -> Option<f64> {
    let mut any_usable = false;
    let mut sum = 0.0;
    for row in rows {
        let Some((weight, is_event)) = row.usable() else {
            continue;
        };
        any_usable = true;
        let truth = if is_event { 0.0 } else { 1.0 };
        sum += weight * (truth - row.survival).powi(2);
    }
    (any_usable && n_observations > 0).then(|| sum / n_observations as f64)
}

/// Integrated Brier score over sorted per-time values.
///
/// The trapezoidal area under the Brier curve divided by the largest evaluation
/// time. Undefined with fewer than two time points, a largest time of zero, or
/// any undefined per-time value.
pub(crate) fn integrated_brier_score(per_time: &[(f64, Option<f64>)]) -> Option<f64> {
    if per_time.len() < 2 {
        return None;
    }
    let points = per_time
        .iter()
        .map(|&(t, value)| value.map(|v| (t, v)))
        .collect::<Option<Vec<_>>>()?;
    let max_time = points.last()?.0;
    (max_time > 0.0).then(|| trapezoid(&points) / max_time)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::category::Category;

    fn row(category: Category, weight: Option<f64>, survival: f64) -> EvaluationRow {
        EvaluationRow {
            observation: 0,
            eval_time: 1.0,
            category,
            weight,
            survival,
        }
    }

    #[test]
    fn test_perfect_prediction_is_zero() {
        let rows = [
            row(Category::Event, Some(1.3), 0.0),
            row(Category::NonEvent, Some(2.0), 1.0),
        ];
        assert_eq!(brier_score(&rows, 2), Some(0.0));
    }

    #[test]
    fn test_uninformative_prediction() {
        let rows = [
            row(Category::Event, Some(1.0), 0.5),
            row(Category::NonEvent, Some(1.0), 0.5),
            row(Category::NonEvent, Some(1.0), 0.5),
        ];
        assert_eq!(brier_score(&rows, 3), Some(0.25));
    }

    #[test]
    fn test_unusable_rows_count_in_denominator() {
        let rows = [
            row(Category::Event, Some(2.0), 0.5),
            row(Category::Unusable, None, 0.5),
        ];
        // 2.0 * 0.25 / 2
        assert_eq!(brier_score(&rows, 2), Some(0.25));
    }

    #[test]
    fn test_no_usable_rows() {
        let rows = [row(Category::Unusable, None, 0.5)];
        assert_eq!(brier_score(&rows, 1), None);
        assert_eq!(brier_score(&[], 0), None);
    }

    #[test]
    fn test_integrated() {
        let per_time = [(1.0, Some(0.1)), (2.0, Some(0.2)), (4.0, Some(0.2))];
        // (0.15 + 0.4) / 4
        assert_relative_eq!(
            integrated_brier_score(&per_time).unwrap(),
            0.1375,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integrated_undefined() {
        assert_eq!(integrated_brier_score(&[(1.0, Some(0.1))]), None);
        assert_eq!(
            integrated_brier_score(&[(1.0, Some(0.1)), (2.0, None)]),
            None
        );
        assert_eq!(
            integrated_brier_score(&[(0.0, Some(0.1)), (0.0, Some(0.1))]),
            None
        );
    }
}

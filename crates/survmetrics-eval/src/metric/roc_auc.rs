use crate::frame::EvaluationRow;

/// Weighted area under the ROC curve at one evaluation time.
///
/// Computed as a weighted Mann-Whitney statistic: every (event, non-event) pair
/// of usable rows contributes the product of their weights when the event row
/// has the lower predicted survival, and half of it when the two are tied.
///
/// Returns `None` when no row is usable and `Some(0.5)` when only one class is
/// present.
pub(crate) fn roc_auc(rows: &[EvaluationRow]) -> Option<f64> {
    let mut scored = rows
        .iter()
        .filter_map(|row| row.usable().map(|(weight, is_event)| (row.survival, weight, is_event)))
        .collect::<Vec<_>>();
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut event_below = 0.0;
    let mut concordant = 0.0;
    let mut total_event = 0.0;
    let mut total_non_event = 0.0;

    // Walk groups of tied survival from lowest to highest
    for group in scored.chunk_by(|a, b| a.0 == b.0) {
        let (event_weight, non_event_weight) =
            group
                .iter()
                .fold((0.0, 0.0), |(event, non_event), &(_, weight, is_event)| {
                    if is_event {
                        (event + weight, non_event)
                    } else {
                        (event, non_event + weight)
                    }
                });
        concordant += non_event_weight * (event_below + 0.5 * event_weight);
        event_below += event_weight;
        total_event += event_weight;
        total_non_event += non_event_weight;
    }

    if total_event <= 0.0 || total_non_event <= 0.0 {
        return Some(0.5);
    }
    Some(concordant / (total_event * total_non_event))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::category::Category;

    fn row(category: Category, weight: f64, survival: f64) -> EvaluationRow {
        EvaluationRow {
            observation: 0,
            eval_time: 1.0,
            category,
            weight: Some(weight),
            survival,
        }
    }

    #[test]
    fn test_perfect_ranking() {
        let rows = [
            row(Category::Event, 1.0, 0.1),
            row(Category::Event, 1.0, 0.2),
            row(Category::NonEvent, 1.0, 0.8),
            row(Category::NonEvent, 1.0, 0.9),
        ];
        assert_eq!(roc_auc(&rows), Some(1.0));
    }

    #[test]
    fn test_reversed_ranking() {
        let rows = [
            row(Category::Event, 1.0, 0.9),
            row(Category::NonEvent, 1.0, 0.1),
        ];
        assert_eq!(roc_auc(&rows), Some(0.0));
    }

    #[test]
    fn test_all_tied_is_half() {
        let rows = [
            row(Category::Event, 2.0, 0.5),
            row(Category::NonEvent, 1.0, 0.5),
            row(Category::NonEvent, 3.0, 0.5),
        ];
        assert_eq!(roc_auc(&rows), Some(0.5));
    }

    #[test]
    fn test_weights_change_the_statistic() {
        // Pairs: (e1, n1) concordant, (e2, n1) discordant
        let rows = [
            row(Category::Event, 3.0, 0.2),
            row(Category::NonEvent, 1.0, 0.5),
            row(Category::Event, 1.0, 0.8),
        ];
        assert_relative_eq!(roc_auc(&rows).unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_sets() {
        assert_eq!(roc_auc(&[]), None);
        let one_class = [
            row(Category::NonEvent, 1.0, 0.2),
            row(Category::NonEvent, 1.0, 0.4),
        ];
        assert_eq!(roc_auc(&one_class), Some(0.5));

        let unusable = [EvaluationRow {
            observation: 0,
            eval_time: 1.0,
            category: Category::Unusable,
            weight: None,
            survival: 0.3,
        }];
        assert_eq!(roc_auc(&unusable), None);
    }
}

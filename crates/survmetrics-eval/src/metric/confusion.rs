use serde::{Deserialize, Serialize};

use crate::frame::EvaluationRow;

/// Weighted 2x2 contingency table at one evaluation time.
///
/// The event is the positive class. A row is predicted to be a non-event when
/// its predicted survival is at least the threshold. Each usable row adds its
/// censoring weight, not `1`, to exactly one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Predicted event, actual event.
    pub true_positive: f64,
    /// Predicted event, actual non-event.
    pub false_positive: f64,
    /// Predicted non-event, actual event.
    pub false_negative: f64,
    /// Predicted non-event, actual non-event.
    pub true_negative: f64,
}

impl ConfusionMatrix {
    pub(crate) fn from_rows(rows: &[EvaluationRow], threshold: f64) -> Self {
        let mut table = Self::default();
        for row in rows {
            let Some((weight, is_event)) = row.usable() else {
                continue;
            };
            let predicted_event = row.survival < threshold;
            let cell = match (predicted_event, is_event) {
                (true, true) => &mut table.true_positive,
                (true, false) => &mut table.false_positive,
                (false, true) => &mut table.false_negative,
                (false, false) => &mut table.true_negative,
            };
            *cell += weight;
        }
        table
    }

    /// Total weight in the table.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    /// True positive rate, `TP / (TP + FN)`.
    #[must_use]
    pub fn sensitivity(&self) -> Option<f64> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_negative,
        )
    }

    /// True negative rate, `TN / (TN + FP)`.
    #[must_use]
    pub fn specificity(&self) -> Option<f64> {
        ratio(
            self.true_negative,
            self.true_negative + self.false_positive,
        )
    }

    /// Positive predictive value, `TP / (TP + FP)`.
    #[must_use]
    pub fn precision(&self) -> Option<f64> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive,
        )
    }

    /// False negative rate, `FN / (TP + FN)`.
    #[must_use]
    pub fn miss_rate(&self) -> Option<f64> {
        ratio(
            self.false_negative,
            self.true_positive + self.false_negative,
        )
    }

    /// False positive rate, `FP / (TN + FP)`.
    #[must_use]
    pub fn fall_out(&self) -> Option<f64> {
        ratio(
            self.false_positive,
            self.true_negative + self.false_positive,
        )
    }

    /// `(TP + TN) / total`.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.total())
    }
}

/// Rate with an undefined (`None`) result for an empty denominator.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

#[cfg(test)]
mod tests {
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
    fn test_weighted_cells() {
        let rows = [
            row(Category::Event, Some(2.0), 0.2),
            row(Category::Event, Some(1.0), 0.9),
            row(Category::NonEvent, Some(1.5), 0.4),
            row(Category::NonEvent, Some(1.0), 0.5),
            row(Category::Unusable, None, 0.1),
        ];
        let table = ConfusionMatrix::from_rows(&rows, 0.5);
        assert_eq!(table.true_positive, 2.0);
        assert_eq!(table.false_negative, 1.0);
        assert_eq!(table.false_positive, 1.5);
        assert_eq!(table.true_negative, 1.0);
        assert_eq!(table.total(), 5.5);
        assert_eq!(table.sensitivity(), Some(2.0 / 3.0));
        assert_eq!(table.specificity(), Some(0.4));
        assert_eq!(table.miss_rate(), Some(1.0 / 3.0));
        assert_eq!(table.fall_out(), Some(0.6));
        assert_eq!(table.precision(), Some(2.0 / 3.5));
        assert_eq!(table.accuracy(), Some(3.0 / 5.5));
    }

    #[test]
    fn test_single_class_has_undefined_rates() {
        let rows = [
            row(Category::NonEvent, Some(1.0), 0.9),
            row(Category::NonEvent, Some(1.0), 0.1),
        ];
        let table = ConfusionMatrix::from_rows(&rows, 0.5);
        assert_eq!(table.true_positive, 0.0);
        assert_eq!(table.false_negative, 0.0);
        assert_eq!(table.sensitivity(), None);
        assert_eq!(table.miss_rate(), None);
        assert_eq!(table.specificity(), Some(0.5));
    }

    #[test]
    fn test_empty_table() {
        let table = ConfusionMatrix::from_rows(&[], 0.5);
        assert_eq!(table, ConfusionMatrix::default());
        assert_eq!(table.accuracy(), None);
    }
}

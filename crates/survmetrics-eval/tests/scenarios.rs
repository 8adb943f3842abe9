//! End-to-end evaluation scenarios on small literal samples.

use approx::assert_relative_eq;
use survmetrics_eval::{
    aggregate_metric, aggregate_metrics,
    category::Category,
    censoring::{EstimatorConfig, ProbabilityFloor},
    censoring_weight, encode_category, fit_censoring_estimator,
    frame::PredictedSurvival,
    metric::MetricKind,
    observation::Observation,
};

fn predictions_for(eval_times: &[f64], survival: &[Vec<f64>]) -> Vec<Vec<PredictedSurvival>> {
    survival
        .iter()
        .map(|row| {
            eval_times
                .iter()
                .zip(row)
                .map(|(&eval_time, &survival)| PredictedSurvival {
                    eval_time,
                    survival,
                })
                .collect()
        })
        .collect()
}

fn constant_predictions(n: usize, eval_times: &[f64], survival: f64) -> Vec<Vec<PredictedSurvival>> {
    predictions_for(eval_times, &vec![vec![survival; eval_times.len()]; n])
}

#[test]
fn two_row_sample_categories_over_time() {
    let sample = [
        Observation::event(5.0).unwrap(),
        Observation::censored(3.0).unwrap(),
    ];
    let categories_at = |t: f64| {
        sample
            .iter()
            .map(|obs| encode_category(obs, t).unwrap())
            .collect::<Vec<_>>()
    };

    assert_eq!(categories_at(1.0), vec![Category::NonEvent, Category::NonEvent]);
    assert_eq!(categories_at(4.0), vec![Category::NonEvent, Category::Unusable]);
    assert_eq!(categories_at(10.0), vec![Category::Event, Category::Unusable]);
}

#[test]
fn four_row_sample_end_to_end() {
    let sample = [
        Observation::event(4.83).unwrap(),
        Observation::event(6.11).unwrap(),
        Observation::censored(6.60).unwrap(),
        Observation::event(2.72).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();

    let categories = sample
        .iter()
        .map(|obs| encode_category(obs, 5.0).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            Category::Event,
            Category::NonEvent,
            Category::NonEvent,
            Category::Event,
        ]
    );

    // The only censoring is at 6.60, after every weight time used at t = 5
    for obs in &sample {
        assert_eq!(censoring_weight(&estimator, obs, 5.0).unwrap(), Some(1.0));
    }

    // Perfect predictions: events at 0, non-events at 1
    let predictions = predictions_for(&[5.0], &[vec![0.0], vec![1.0], vec![1.0], vec![0.0]]);
    let results = aggregate_metrics(
        &[
            MetricKind::BrierScore,
            MetricKind::RocAuc,
            MetricKind::Sensitivity { threshold: 0.5 },
            MetricKind::Specificity { threshold: 0.5 },
        ],
        &estimator,
        &sample,
        &predictions,
        &[5.0],
    )
    .unwrap();
    assert_eq!(results[0].scalar_at(5.0), Some(0.0));
    assert_eq!(results[1].scalar_at(5.0), Some(1.0));
    assert_eq!(results[2].scalar_at(5.0), Some(1.0));
    assert_eq!(results[3].scalar_at(5.0), Some(1.0));
    assert!(results.iter().all(|r| r.per_time[0].n_usable == 4));
}

#[test]
fn weights_reflect_earlier_censoring() {
    let training = [
        Observation::censored(1.0).unwrap(),
        Observation::event(2.0).unwrap(),
        Observation::event(3.0).unwrap(),
        Observation::event(4.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&training, &EstimatorConfig::default()).unwrap();

    // G(u) = 3/4 after the censoring at 1.0
    let late_event = Observation::event(3.0).unwrap();
    assert_relative_eq!(
        censoring_weight(&estimator, &late_event, 3.5).unwrap().unwrap(),
        4.0 / 3.0,
        epsilon = 1e-12
    );
    let still_alive = Observation::event(4.0).unwrap();
    assert_relative_eq!(
        censoring_weight(&estimator, &still_alive, 3.5).unwrap().unwrap(),
        4.0 / 3.0,
        epsilon = 1e-12
    );
    // Censored at 1.0 and evaluated at 1.0: unusable
    assert_eq!(
        censoring_weight(&estimator, &training[0], 1.0).unwrap(),
        None
    );
}

#[test]
fn weighted_brier_uses_total_count() {
    let sample = [
        Observation::censored(1.0).unwrap(),
        Observation::event(2.0).unwrap(),
        Observation::event(3.0).unwrap(),
        Observation::event(4.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let predictions = constant_predictions(sample.len(), &[2.5], 0.5);

    let result = aggregate_metric(
        MetricKind::BrierScore,
        &estimator,
        &sample,
        &predictions,
        &[2.5],
    )
    .unwrap();

    // Rows: unusable, event (w=4/3), non-event (w=4/3), non-event (w=4/3)
    assert_eq!(result.per_time[0].n_usable, 3);
    assert_relative_eq!(
        result.scalar_at(2.5).unwrap(),
        3.0 * (4.0 / 3.0) * 0.25 / 4.0,
        epsilon = 1e-12
    );
}

#[test]
fn brier_bounds_without_censoring() {
    let sample = [
        Observation::event(1.0).unwrap(),
        Observation::event(2.0).unwrap(),
        Observation::event(3.0).unwrap(),
        Observation::event(4.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    assert!(estimator.is_degenerate());
    let eval_times = [1.5, 2.5, 3.5];

    let uninformative = constant_predictions(sample.len(), &eval_times, 0.5);
    let result = aggregate_metric(
        MetricKind::BrierScore,
        &estimator,
        &sample,
        &uninformative,
        &eval_times,
    )
    .unwrap();
    for (_, value) in result.scalars() {
        assert_eq!(value, Some(0.25));
    }
    assert_relative_eq!(result.integrated.unwrap(), 0.25 * 2.0 / 3.5, epsilon = 1e-12);

    // Perfect: survival 1 while event-free, 0 once the event happened
    let survival = sample
        .iter()
        .map(|obs| {
            eval_times
                .iter()
                .map(|&t| if obs.time() <= t { 0.0 } else { 1.0 })
                .collect()
        })
        .collect::<Vec<_>>();
    let perfect = predictions_for(&eval_times, &survival);
    let result = aggregate_metric(
        MetricKind::BrierScore,
        &estimator,
        &sample,
        &perfect,
        &eval_times,
    )
    .unwrap();
    for (_, value) in result.scalars() {
        assert_eq!(value, Some(0.0));
    }
    assert_eq!(result.integrated, Some(0.0));
}

#[test]
fn integrated_brier_ignores_input_order() {
    let sample = [
        Observation::event(1.0).unwrap(),
        Observation::censored(1.5).unwrap(),
        Observation::event(2.0).unwrap(),
        Observation::censored(2.5).unwrap(),
        Observation::event(3.0).unwrap(),
        Observation::event(4.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let sorted = [0.5, 1.2, 2.2, 3.3];
    let shuffled = [3.3, 0.5, 2.2, 1.2];
    let survival = [0.9, 0.7, 0.5, 0.3];
    let predictions = vec![
        predictions_for(&sorted, &[survival.to_vec()])[0].clone();
        sample.len()
    ];

    let a = aggregate_metric(MetricKind::BrierScore, &estimator, &sample, &predictions, &sorted)
        .unwrap();
    let b = aggregate_metric(MetricKind::BrierScore, &estimator, &sample, &predictions, &shuffled)
        .unwrap();
    assert_eq!(a, b);
    assert!(a.integrated.is_some());
}

#[test]
fn empty_usable_set_is_undefined() {
    let sample = [
        Observation::censored(1.0).unwrap(),
        Observation::censored(2.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let predictions = constant_predictions(sample.len(), &[5.0], 0.5);

    for kind in [
        MetricKind::BrierScore,
        MetricKind::RocAuc,
        MetricKind::Sensitivity { threshold: 0.5 },
    ] {
        let result = aggregate_metric(kind, &estimator, &sample, &predictions, &[5.0]).unwrap();
        assert_eq!(result.per_time[0].n_usable, 0);
        assert_eq!(result.scalar_at(5.0), None);
    }
}

#[test]
fn single_class_roc_auc_is_half() {
    let sample = [
        Observation::event(10.0).unwrap(),
        Observation::event(12.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let predictions = predictions_for(&[1.0], &[vec![0.9], vec![0.2]]);
    let result =
        aggregate_metric(MetricKind::RocAuc, &estimator, &sample, &predictions, &[1.0]).unwrap();
    assert_eq!(result.scalar_at(1.0), Some(0.5));
}

#[test]
fn excluded_rows_leave_the_usable_set() {
    let sample = [
        Observation::event(1.0).unwrap(),
        Observation::censored(2.0).unwrap(),
        Observation::event(3.0).unwrap(),
        Observation::censored(4.0).unwrap(),
    ];
    let config = EstimatorConfig {
        floor: ProbabilityFloor::Exclude,
    };
    let estimator = fit_censoring_estimator(&sample, &config).unwrap();
    let test = [Observation::event(9.0).unwrap()];
    let predictions = constant_predictions(1, &[5.0], 0.5);

    // G(5-) = 0 for the training sample, so the non-event row has no weight
    let result =
        aggregate_metric(MetricKind::BrierScore, &estimator, &test, &predictions, &[5.0]).unwrap();
    assert_eq!(result.per_time[0].n_usable, 0);
    assert_eq!(result.scalar_at(5.0), None);

    let truncated = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let weight = censoring_weight(&truncated, &test[0], 5.0).unwrap().unwrap();
    assert!(weight.is_finite());
    assert_relative_eq!(weight, 100.0, epsilon = 1e-9);
}

#[test]
fn confusion_matrix_table() {
    let sample = [
        Observation::event(1.0).unwrap(),
        Observation::event(2.0).unwrap(),
        Observation::event(5.0).unwrap(),
        Observation::event(6.0).unwrap(),
    ];
    let estimator = fit_censoring_estimator(&sample, &EstimatorConfig::default()).unwrap();
    let predictions = predictions_for(&[3.0], &[vec![0.2], vec![0.7], vec![0.4], vec![0.9]]);
    let result = aggregate_metric(
        MetricKind::ConfusionMatrix { threshold: 0.5 },
        &estimator,
        &sample,
        &predictions,
        &[3.0],
    )
    .unwrap();
    let table = result.per_time[0].value.table().unwrap();
    assert_eq!(table.true_positive, 1.0);
    assert_eq!(table.false_negative, 1.0);
    assert_eq!(table.false_positive, 1.0);
    assert_eq!(table.true_negative, 1.0);
}

//! Numerical integration over sampled curves
//!
//! Metrics evaluated at a grid of time points are summarized by the area under
//! the resulting piecewise-linear curve.

/// Computes the trapezoidal-rule area under a sampled curve.
///
/// Points are `(x, y)` pairs and must be sorted by `x` in ascending order.
/// Fewer than two points enclose no area and yield `0.0`.
///
/// # Panics
///
/// Panics if the points are not sorted by `x`.
///
/// # Examples
///
/// ```
/// use survmetrics_stats::integrate::trapezoid;
///
/// let area = trapezoid(&[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)]);
/// assert_eq!(area, 1.5);
/// ```
#[must_use]
pub fn trapezoid(points: &[(f64, f64)]) -> f64 {
    assert!(
        points.is_sorted_by(|a, b| a.0 <= b.0),
        "points must be sorted by x in ascending order"
    );

    points
        .windows(2)
        .map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            (x1 - x0) * (y0 + y1) / 2.0
        })
        .sum()
}

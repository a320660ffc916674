use {argminmax::ArgMinMax, statrs::statistics::Statistics};

/// Index and value of the largest element. None on empty input.
/// Ties resolve to the first occurrence.
#[inline]
pub fn get_max(vec: &[f64]) -> Option<(usize, f64)> {
    if vec.is_empty() {
        return None;
    }
    let max_index: usize = vec.argmax();
    Some((max_index, vec[max_index]))
}

/// Index and value of the smallest element. None on empty input.
/// Ties resolve to the first occurrence.
#[inline]
pub fn get_min(vec: &[f64]) -> Option<(usize, f64)> {
    if vec.is_empty() {
        return None;
    }
    let min_index: usize = vec.argmin();
    Some((min_index, vec[min_index]))
}

/// Least-squares slope of `values` against their position (0, 1, 2, ...).
/// Returns 0 when fewer than 2 points are given.
pub fn linear_regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().mean();

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    if den <= f64::EPSILON { 0.0 } else { num / den }
}

/// Population mean and standard deviation. (0, 0) on empty input.
#[inline]
pub fn mean_and_stddev(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    (data.iter().mean(), data.iter().population_std_dev())
}

/// Pearson correlation of two equally long samples.
/// None when fewer than 3 pairs exist or either side has zero variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 3 {
        return None;
    }
    let (a, b) = (&a[a.len() - n..], &b[b.len() - n..]);
    let (mean_a, std_a) = mean_and_stddev(a);
    let (mean_b, std_b) = mean_and_stddev(b);
    if std_a <= f64::EPSILON || std_b <= f64::EPSILON {
        return None;
    }

    let cov = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / n as f64;

    Some((cov / (std_a * std_b)).clamp(-1.0, 1.0))
}

/// Percentage returns of consecutive `(a, b)` pairs, kept side by side.
/// A step is dropped on both sides when either base is zero.
pub fn paired_pct_returns(pairs: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    pairs
        .windows(2)
        .filter(|w| w[0].0.abs() > f64::EPSILON && w[0].1.abs() > f64::EPSILON)
        .map(|w| (w[1].0 / w[0].0 - 1.0, w[1].1 / w[0].1 - 1.0))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn extremes_report_first_index() {
        let values = [3.0, 7.5, 1.0, 7.5, 1.0];
        assert_eq!(get_max(&values), Some((1, 7.5)));
        assert_eq!(get_min(&values), Some((2, 1.0)));
        assert_eq!(get_max(&[]), None);
        assert_eq!(get_min(&[]), None);
    }

    #[test]
    fn slope_of_a_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 2.5 * i as f64).collect();
        assert_abs_diff_eq!(linear_regression_slope(&values), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn slope_needs_two_points() {
        assert_eq!(linear_regression_slope(&[]), 0.0);
        assert_eq!(linear_regression_slope(&[42.0]), 0.0);
    }

    #[test]
    fn correlation_of_mirrored_series() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert_abs_diff_eq!(pearson_correlation(&a, &a).unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pearson_correlation(&a, &b).unwrap(), -1.0, epsilon = 1e-9);
        assert!(pearson_correlation(&a, &[2.0, 2.0, 2.0]).is_none());
    }

    #[test]
    fn zero_base_drops_the_step_on_both_sides() {
        let pairs = [(100.0, 200.0), (0.0, 210.0), (50.0, 220.0), (55.0, 231.0)];
        let (a, b) = paired_pct_returns(&pairs);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert_abs_diff_eq!(a[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b[0], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(a[1], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(b[1], 0.05, epsilon = 1e-12);
    }
}

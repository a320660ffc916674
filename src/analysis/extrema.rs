/// A detected extremum: (position in the series, value).
pub type Pivot = (usize, f64);

/// Local minima over a symmetric window of `2 * order + 1` samples.
/// Ties count, so plateaus yield consecutive pivots, but a window whose samples
/// are all equal is not an extremum.
pub fn local_minima(series: &[f64], order: usize) -> Vec<Pivot> {
    local_extrema(series, order, |center, other| center <= other)
}

/// Local maxima, with the same window rules as [`local_minima`].
pub fn local_maxima(series: &[f64], order: usize) -> Vec<Pivot> {
    local_extrema(series, order, |center, other| center >= other)
}

fn local_extrema(series: &[f64], order: usize, keeps: impl Fn(f64, f64) -> bool) -> Vec<Pivot> {
    let n = series.len();
    if order == 0 || n < 2 * order + 1 {
        return Vec::new();
    }

    (order..n - order)
        .filter_map(|i| {
            let window = &series[i - order..=i + order];
            let center = series[i];

            if window.iter().any(|v| !v.is_finite()) {
                return None;
            }
            let all_equal = window.iter().all(|&v| v == center);
            let holds = window.iter().all(|&v| keeps(center, v));

            (holds && !all_equal).then_some((i, center))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_valley_and_peak() {
        let s = [5.0, 4.0, 3.0, 4.0, 5.0, 4.0, 3.0];
        assert_eq!(local_minima(&s, 2), vec![(2, 3.0)]);
        assert_eq!(local_maxima(&s, 2), vec![(4, 5.0)]);
    }

    #[test]
    fn plateau_yields_consecutive_pivots() {
        let s = [5.0, 3.0, 3.0, 5.0, 6.0];
        assert_eq!(local_minima(&s, 1), vec![(1, 3.0), (2, 3.0)]);
    }

    #[test]
    fn constant_series_has_no_extrema() {
        let s = vec![100.0; 50];
        assert!(local_minima(&s, 3).is_empty());
        assert!(local_maxima(&s, 3).is_empty());
    }

    #[test]
    fn short_series_and_zero_order_are_empty() {
        let s = [1.0, 0.0, 1.0, 2.0];
        assert!(local_minima(&s, 2).is_empty());
        assert!(local_minima(&s, 0).is_empty());
        assert_eq!(local_minima(&s, 1), vec![(1, 0.0)]);
    }

    #[test]
    fn nan_poisons_its_windows() {
        let s = [3.0, 1.0, 3.0, f64::NAN, 3.0, 1.0, 3.0];
        assert_eq!(local_minima(&s, 1), vec![(1, 1.0), (5, 1.0)]);
        assert!(local_minima(&s, 2).is_empty());
    }
}

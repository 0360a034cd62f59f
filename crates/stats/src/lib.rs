//! Statistical helper functions for the heatdays crates.
//!
//! Everything here operates on plain `f64` slices. Callers filter missing
//! values before calling in; these helpers never see NaN by contract.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator (matching pandas' `std(ddof=1)` squared).
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Linear interpolation between order statistics (Hyndman-Fan type 7).
///
/// This is the default rule of numpy's `percentile` and xarray's `quantile`.
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Copies the finite values of `data` into `buf` and sorts them ascending.
///
/// `buf` is cleared first so one allocation can be reused across pixels.
/// Returns the number of finite values kept.
pub fn sorted_finite_into(data: impl IntoIterator<Item = f64>, buf: &mut Vec<f64>) -> usize {
    buf.clear();
    buf.extend(data.into_iter().filter(|v| v.is_finite()));
    buf.sort_by(|a, b| a.total_cmp(b));
    buf.len()
}

/// Weighted mean `Σ v·w / Σ w` over pairs.
///
/// Returns `None` when the total weight is not strictly positive.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let mut num = 0.0;
    let mut den = 0.0;
    for (v, w) in pairs {
        num += v * w;
        den += w;
    }
    if den > 0.0 { Some(num / den) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_sd_single() {
        assert_eq!(sd(&[5.0]), 0.0);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_variance_empty() {
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn test_quantile_type7_endpoints() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_type7(&sorted, 0.0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(quantile_type7(&sorted, 1.0), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_quantile_type7_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        // p=0.1 → h=0.4, lo=0, hi=1 → 1 + 0.4*(2-1) = 1.4
        assert_relative_eq!(quantile_type7(&sorted, 0.1), 1.4, epsilon = 1e-10);
    }

    #[test]
    fn test_quantile_type7_numpy_crossvalidation() {
        // numpy.percentile(np.arange(1, 101), 95) == 95.05
        let sorted: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert_relative_eq!(quantile_type7(&sorted, 0.95), 95.05, epsilon = 1e-10);
        // numpy.percentile(np.arange(1, 101), 90) == 90.1
        assert_relative_eq!(quantile_type7(&sorted, 0.90), 90.1, epsilon = 1e-10);
    }

    #[test]
    fn test_quantile_type7_single() {
        assert_relative_eq!(quantile_type7(&[7.5], 0.95), 7.5, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "quantile_type7: input must not be empty")]
    fn test_quantile_type7_empty_panics() {
        quantile_type7(&[], 0.5);
    }

    #[test]
    fn test_sorted_finite_into_drops_nan_and_reuses_buffer() {
        let mut buf = vec![99.0; 8];
        let n = sorted_finite_into([3.0, f64::NAN, 1.0, f64::INFINITY, 2.0], &mut buf);
        assert_eq!(n, 3);
        assert_eq!(buf, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_weighted_mean() {
        let w = weighted_mean([(5.0, 100.0), (15.0, 300.0)]).unwrap();
        assert_relative_eq!(w, 12.5, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_mean_zero_weight() {
        assert!(weighted_mean([(5.0, 0.0), (15.0, 0.0)]).is_none());
        assert!(weighted_mean(std::iter::empty()).is_none());
    }
}

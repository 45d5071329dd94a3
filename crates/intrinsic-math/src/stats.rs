//! Guarded ratios and averages.
//!
//! Financial ratios computed from provider data routinely hit zero or
//! negative denominators. These helpers return `None` for such points so
//! callers can drop them from averages instead of propagating `NaN`.

/// Tolerance below which a denominator is treated as zero.
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// `numerator / denominator`, or `None` if the denominator is near zero or
/// the result is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() < ZERO_TOLERANCE {
        return None;
    }
    Some(numerator / denominator).filter(|r| r.is_finite())
}

/// Like [`safe_div`] but also rejects non-positive denominators.
///
/// Used for ratios whose base must be positive to be meaningful (return on
/// equity against book equity, tax rate against pre-tax income).
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator <= ZERO_TOLERANCE {
        return None;
    }
    safe_div(numerator, denominator)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the defined, finite values; `None` if there are none.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Compound annual growth rate from `first` to `last` over `years`.
///
/// `None` if either endpoint is non-positive or `years` is not positive.
pub fn cagr(first: f64, last: f64, years: f64) -> Option<f64> {
    if first <= 0.0 || last <= 0.0 || years <= 0.0 {
        return None;
    }
    Some((last / first).powf(1.0 / years) - 1.0).filter(|r| r.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 4.0), Some(0.25));
        assert_eq!(safe_div(1.0, -4.0), Some(-0.25));
        assert_eq!(safe_div(1.0, 0.0), None);
        assert_eq!(safe_div(f64::INFINITY, 1.0), None);
    }

    #[test]
    fn test_safe_ratio_rejects_negative_base() {
        assert_eq!(safe_ratio(1.0, 4.0), Some(0.25));
        assert_eq!(safe_ratio(1.0, -4.0), None);
        assert_eq!(safe_ratio(1.0, 0.0), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_mean_defined_skips_missing() {
        let values = [Some(0.1), None, Some(0.3), Some(f64::NAN)];
        assert_relative_eq!(mean_defined(values).unwrap(), 0.2);
        assert_eq!(mean_defined([None, None]), None);
    }

    #[test]
    fn test_cagr() {
        assert_relative_eq!(cagr(100.0, 121.0, 2.0).unwrap(), 0.1, epsilon = 1e-12);
        assert_eq!(cagr(0.0, 121.0, 2.0), None);
        assert_eq!(cagr(100.0, -1.0, 2.0), None);
        assert_eq!(cagr(100.0, 121.0, 0.0), None);
    }
}

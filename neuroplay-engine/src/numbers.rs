//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Ratio of two counts, returning `fallback` when the denominator is zero.
#[must_use]
pub fn ratio_or(numerator: usize, denominator: usize, fallback: f64) -> f64 {
    if denominator == 0 {
        return fallback;
    }
    usize_to_f64(numerator) / usize_to_f64(denominator)
}

/// Round to a fixed number of decimal places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Multiply then clamp into `[min, max]`.
///
/// Never panics: NaN products collapse to `min`, and an inverted range
/// resolves to `max` rather than aborting like [`f64::clamp`].
#[must_use]
pub fn scale_clamped(value: f64, factor: f64, min: f64, max: f64) -> f64 {
    let scaled = value * factor;
    if scaled.is_nan() {
        return min;
    }
    scaled.max(min).min(max)
}

/// Arithmetic mean and population standard deviation, or `None` when empty.
#[must_use]
pub fn mean_and_population_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let count = usize_to_f64(values.len());
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_zero_denominator() {
        assert!((ratio_or(3, 0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((ratio_or(7, 10, 1.0) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn round_to_handles_non_finite() {
        assert!((round_to(66.666_666, 1) - 66.7).abs() < 1e-9);
        assert!(round_to(f64::NAN, 1).abs() < f64::EPSILON);
    }

    #[test]
    fn scale_clamped_respects_bounds_and_nan() {
        assert!((scale_clamped(14.0, 1.1, 3.0, 15.0) - 15.0).abs() < f64::EPSILON);
        assert!((scale_clamped(3.1, 0.9, 3.0, 15.0) - 3.0).abs() < f64::EPSILON);
        assert!((scale_clamped(f64::NAN, 1.0, 3.0, 15.0) - 3.0).abs() < f64::EPSILON);
        assert!((scale_clamped(5.0, 1.0, 10.0, 2.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn population_std_dev_is_not_bessel_corrected() {
        let (mean, std_dev) = mean_and_population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])
            .expect("non-empty");
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std_dev - 2.0).abs() < 1e-12);
        assert!(mean_and_population_std_dev(&[]).is_none());
    }
}

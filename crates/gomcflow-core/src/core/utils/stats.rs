/// Arithmetic mean. NaN for an empty slice; a NaN entry propagates, matching
/// the aggregation policy that an incomplete set must never look complete.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Arithmetic mean over the non-NaN entries only; NaN when nothing survives.
/// Missing samples are excluded from the mean, never counted as zero.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &value in values {
        if !value.is_nan() {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Bessel-corrected (N−1) sample standard deviation. Undefined below two
/// samples; reported as NaN rather than faulting on the zero denominator.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_known_values() {
        assert_eq!(mean(&[0.98, 1.00, 1.02]), 1.0);
    }

    #[test]
    fn mean_of_empty_slice_is_nan_not_zero() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn mean_propagates_nan_entries() {
        assert!(mean(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn nan_mean_excludes_nan_entries_from_the_denominator() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
    }

    #[test]
    fn nan_mean_of_all_nan_is_nan() {
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn sample_std_dev_uses_the_bessel_correction() {
        // Two samples: std = |a - b| / sqrt(2).
        let std = sample_std_dev(&[0.98, 1.02]);
        assert!((std - 0.028284271247461906).abs() < 1e-12);
    }

    #[test]
    fn sample_std_dev_of_a_single_sample_is_nan_without_panicking() {
        assert!(sample_std_dev(&[1.0]).is_nan());
        assert!(sample_std_dev(&[]).is_nan());
    }

    #[test]
    fn sample_std_dev_of_identical_samples_is_zero() {
        assert_eq!(sample_std_dev(&[500.0, 500.0, 500.0]), 0.0);
    }
}

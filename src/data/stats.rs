//! Summary statistics shared by the split strategies, leaves and ensembles.

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the average of the two middle values for even lengths.
/// `NaN` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Pearson correlation of two equally long samples.
///
/// `None` when either side has zero variance or fewer than two values,
/// where the coefficient is undefined.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&va, &vb) in a.iter().zip(b) {
        let da = va - mean_a;
        let db = vb - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then_some(r)
}

/// Most frequent value. Among equally frequent values the smallest wins.
/// `NaN` for an empty slice.
pub fn mode(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best = f64::NAN;
    let mut best_count = 0;
    let mut start = 0;
    while start < sorted.len() {
        let value = sorted[start];
        // Signed zeros sort next to each other and compare equal.
        let run = sorted[start..]
            .iter()
            .take_while(|&&v| v == value)
            .count()
            .max(1);
        // Strictly greater keeps the first, i.e. smallest, of tied runs.
        if run > best_count {
            best = value + 0.0;
            best_count = run;
        }
        start += run;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 3.5);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[6.0, 1.0, 2.0, 3.0, 4.0, 5.0]), 3.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let a = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&a, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0);
        assert_relative_eq!(pearson(&a, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_pearson_undefined_for_constant_column() {
        assert_eq!(pearson(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest() {
        assert_eq!(mode(&[1.0, -1.0, 1.0, -1.0, 0.0]), -1.0);
        assert_eq!(mode(&[0.0, 1.0, 1.0]), 1.0);
        assert_eq!(mode(&[3.0]), 3.0);
    }

    #[test]
    fn test_mode_counts_signed_zeros_together() {
        let value = mode(&[0.0, -0.0, 1.0, 1.0]);
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
        assert_eq!(mode(&[-0.0, -0.0, 1.0]), 0.0);
    }
}

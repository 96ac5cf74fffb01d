//! Shared numeric helpers for series statistics

/// Arithmetic mean, 0.0 for an empty series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation coefficient of two equal-length series
///
/// Returns `None` when the coefficient is undefined: mismatched or short
/// input (fewer than two samples), zero variance on either side, or a
/// non-finite result.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    if is_constant(a) || is_constant(b) {
        return None;
    }

    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if !denom.is_finite() || denom == 0.0 {
        return None;
    }

    let r = cov / denom;
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Round to `decimals` places (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to three decimal places, the precision of every capacity figure
pub fn round3(value: f64) -> f64 {
    round_to(value, 3)
}

/// Scale a non-negative series so its maximum becomes 1.0
///
/// Negative and non-finite samples are treated as 0. An all-zero series is
/// returned unchanged.
pub fn normalize_to_unit_max(values: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() && *v > 0.0 { *v } else { 0.0 })
        .collect();
    let max = cleaned.iter().cloned().fold(0.0, f64::max);
    if max <= 0.0 {
        return cleaned;
    }
    cleaned.into_iter().map(|v| v / max).collect()
}

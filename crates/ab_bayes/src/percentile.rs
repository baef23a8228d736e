//! Empirical percentiles with linear interpolation between order statistics.
//!
//! For a sorted sample `x` of size `n` and probability `p`, the position is `h = p * (n - 1)` and
//!
//! ```text
//! q = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])
//! ```

#[cfg(test)]
#[path = "percentile_test.rs"]
mod percentile_test;

/// Percentile of an ascending slice. Returns `None` for an empty slice; `p` is clamped to [0, 1].
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last_index = sorted.len().checked_sub(1)?;
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };

    #[allow(clippy::as_conversions)]
    let position = p * last_index as f64;
    let lower = position.floor();
    #[allow(clippy::as_conversions)]
    let lower_index = (lower as usize).min(last_index);
    let upper_index = (lower_index + 1).min(last_index);

    let weight = position - lower;
    let lower_value = sorted[lower_index];
    Some(lower_value + weight * (sorted[upper_index] - lower_value))
}

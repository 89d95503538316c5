//! Indicator primitives used by the breakout engine.
//!
//! All functions are pure: bar slice in, value(s) out. They operate on
//! whatever window the caller hands them, so look-ahead discipline lives
//! entirely at the call site (the engine only passes completed-bar views).

pub mod atr;
pub mod extremes;

pub use atr::{rolling_atr, true_range_series};
pub use extremes::{highest_high, lowest_low};

/// Midrank percentile of `x` within `values`: (below + equal/2) / n.
///
/// Ties count half, so a flat series ranks at 0.5 instead of pinning to
/// an extreme bucket. Empty input → 0.5 (no evidence either way; keeps
/// regime bucketing defined).
pub fn percentile_rank(values: &[f64], x: f64) -> f64 {
    if values.is_empty() {
        return 0.5;
    }
    let below = values.iter().filter(|&&v| v < x).count() as f64;
    let equal = values.iter().filter(|&&v| v == x).count() as f64;
    (below + equal / 2.0) / values.len() as f64
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}

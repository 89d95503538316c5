//! Synthetic bar series — deterministic fixtures for tests and smoke runs.
//!
//! All generators take an explicit seed and produce sane, strictly
//! increasing hourly bars, so fixtures are reproducible across runs and
//! platforms.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Bar;
use crate::indicators::atr::atr_at_end;

/// Fixed series origin: 2024-01-02 00:00.
pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Seeded random walk of hourly bars.
///
/// Each close moves by `drift` plus uniform noise in ±`noise`; wicks extend
/// beyond the body by a fraction of the noise amplitude. Prices are floored
/// well above zero so every bar passes sanity validation.
pub fn random_walk(n: usize, start_price: f64, drift: f64, noise: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut prev_close = start_price;

    for i in 0..n {
        bars.push(next_bar(&mut rng, series_start(), i, prev_close, drift, noise));
        prev_close = bars[i].close;
    }
    bars
}

/// Flat noise until `breakout_at`, then a one-bar jump of `atr_multiple` ×
/// trailing-20 ATR followed by a persistent uptrend.
///
/// The geometry matches the end-to-end acceptance scenario: quiet regime
/// before the break, a clean multi-ATR breakout bar, and continued trend so
/// later windows keep producing breakout entries.
pub fn breakout_scenario(n: usize, breakout_at: usize, atr_multiple: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut prev_close = 100.0;
    let noise = 0.4;

    for i in 0..n {
        let drift = if i >= breakout_at { 0.25 } else { 0.0 };
        let mut bar = next_bar(&mut rng, series_start(), i, prev_close, drift, noise);

        if i == breakout_at {
            let trailing_atr = atr_at_end(&bars, 20).unwrap_or(noise);
            let jump = atr_multiple * trailing_atr;
            bar.close += jump;
            bar.high = bar.high.max(bar.close + 0.1);
        }

        prev_close = bar.close;
        bars.push(bar);
    }
    bars
}

fn next_bar(
    rng: &mut StdRng,
    start: NaiveDateTime,
    index: usize,
    prev_close: f64,
    drift: f64,
    noise: f64,
) -> Bar {
    let open = prev_close;
    let close = (open + drift + rng.gen_range(-noise..=noise)).max(2.0);
    let wick = rng.gen_range(0.0..=noise) + noise * 0.2;
    let high = open.max(close) + wick;
    let low = (open.min(close) - wick).max(1.0);

    Bar {
        timestamp: start + Duration::hours(index as i64),
        open,
        high,
        low,
        close,
        volume: 1_000 + rng.gen_range(0..500),
    }
}

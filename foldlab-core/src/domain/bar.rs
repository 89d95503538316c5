//! Bar — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar at a single resolution.
///
/// `timestamp` marks the bar's open. Within one series timestamps are
/// strictly increasing; `TimeSeriesStore` enforces this at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Basic OHLCV sanity check: finite fields, high >= max(open, close),
    /// low <= min(open, close), positive prices.
    pub fn is_sane(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();
        finite
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.low > 0.0
    }

    /// True Range against a previous close:
    /// max(high - low, |high - prev_close|, |low - prev_close|).
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high() {
        let mut bar = sample_bar();
        bar.high = 101.0; // below close
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_nan() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn true_range_plain_range() {
        // prev close inside the bar's range: TR = high - low
        let bar = sample_bar();
        assert!((bar.true_range(100.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn true_range_gap_up() {
        // prev close far below the bar: TR = high - prev_close
        let bar = sample_bar();
        assert!((bar.true_range(90.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}

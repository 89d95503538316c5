//! Rolling extremes — highest high and lowest low over a window.

use crate::domain::Bar;

/// Highest high over the slice. None for an empty slice.
pub fn highest_high(bars: &[Bar]) -> Option<f64> {
    bars.iter().map(|b| b.high).fold(None, |acc, h| match acc {
        Some(m) if m >= h => Some(m),
        _ => Some(h),
    })
}

/// Lowest low over the slice. None for an empty slice.
pub fn lowest_low(bars: &[Bar]) -> Option<f64> {
    bars.iter().map(|b| b.low).fold(None, |acc, l| match acc {
        Some(m) if m <= l => Some(m),
        _ => Some(l),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn make_bars(highs_lows: &[(f64, f64)]) -> Vec<Bar> {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        highs_lows
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| Bar {
                timestamp: t0 + Duration::hours(i as i64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: 1,
            })
            .collect()
    }

    #[test]
    fn extremes_over_window() {
        let bars = make_bars(&[(12.0, 9.0), (15.0, 10.0), (14.0, 8.0)]);
        assert_eq!(highest_high(&bars), Some(15.0));
        assert_eq!(lowest_low(&bars), Some(8.0));
    }

    #[test]
    fn empty_window() {
        assert_eq!(highest_high(&[]), None);
        assert_eq!(lowest_low(&[]), None);
    }
}

//! Average True Range — trailing mean of the true range.
//!
//! TR[0] = high[0] - low[0] (no previous close).
//! TR[t] = max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR[t] = mean(TR[t-period+1..=t]); NaN until `period` proper TRs exist.

use crate::domain::Bar;

/// True Range series for a bar slice.
pub fn true_range_series(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            tr.push(bar.high - bar.low);
        } else {
            tr.push(bar.true_range(bars[i - 1].close));
        }
    }
    tr
}

/// Rolling ATR as a simple trailing mean over `period` true ranges.
///
/// TR[0] is not a proper true range (no previous close), so the window
/// starts at TR[1]; index `period` is the first defined value.
pub fn rolling_atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let tr = true_range_series(bars);
    let mut window_sum: f64 = tr[1..=period].iter().sum();
    out[period] = window_sum / period as f64;

    for i in (period + 1)..n {
        window_sum += tr[i] - tr[i - period];
        out[i] = window_sum / period as f64;
    }
    out
}

/// ATR at the final bar of the slice, if the slice is long enough.
pub fn atr_at_end(bars: &[Bar], period: usize) -> Option<f64> {
    let series = rolling_atr(bars, period);
    series.last().copied().filter(|v| !v.is_nan())
}

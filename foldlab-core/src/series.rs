//! TimeSeriesStore — validated, immutable bar storage with range queries.
//!
//! The store is created once per run and shared read-only by every
//! downstream component (wrap in `Arc` for parallel fold evaluation).
//! All range queries are binary searches over the timestamp column; bars
//! are never re-parsed or copied per reader.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::resolution::Resolution;

/// Errors from store construction.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("timestamps not strictly increasing at index {index}")]
    NonIncreasing { index: usize },
    #[error("bar at index {index} fails OHLC sanity (high/low vs open/close)")]
    InsaneBar { index: usize },
}

/// Ordered, immutable bar sequence at a single base resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesStore {
    resolution: Resolution,
    bars: Vec<Bar>,
}

impl TimeSeriesStore {
    /// Validate and take ownership of a bar sequence.
    ///
    /// Rejects non-increasing timestamps and insane OHLC rows up front so
    /// every downstream component can assume a clean series. An empty
    /// sequence is valid; fold planning will reject it later with a
    /// recoverable "insufficient data" status.
    pub fn new(resolution: Resolution, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InsaneBar { index });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonIncreasing { index });
            }
        }
        Ok(Self { resolution, bars })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// Index of the first bar with timestamp >= `ts` (== len if none).
    pub fn index_at_or_after(&self, ts: NaiveDateTime) -> usize {
        self.bars.partition_point(|b| b.timestamp < ts)
    }

    /// Bars with timestamp in `[start, end)`.
    pub fn slice_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Bar] {
        let (lo, hi) = self.index_range(start, end);
        &self.bars[lo..hi]
    }

    /// Index bounds `(lo, hi)` of the half-open timestamp range `[start, end)`.
    pub fn index_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> (usize, usize) {
        let lo = self.index_at_or_after(start);
        let hi = self.index_at_or_after(end);
        (lo, hi.max(lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn hourly_bars(n: usize) -> Vec<Bar> {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: t0 + Duration::hours(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 1_000,
            })
            .collect()
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let mut bars = hourly_bars(3);
        bars[2].timestamp = bars[1].timestamp;
        let err = TimeSeriesStore::new(Resolution::H1, bars).unwrap_err();
        assert!(matches!(err, SeriesError::NonIncreasing { index: 2 }));
    }

    #[test]
    fn rejects_insane_bar() {
        let mut bars = hourly_bars(3);
        bars[1].low = 102.0; // above open and close
        let err = TimeSeriesStore::new(Resolution::H1, bars).unwrap_err();
        assert!(matches!(err, SeriesError::InsaneBar { index: 1 }));
    }

    #[test]
    fn empty_store_is_valid() {
        let store = TimeSeriesStore::new(Resolution::H1, Vec::new()).unwrap();
        assert!(store.is_empty());
        assert!(store.first_timestamp().is_none());
    }

    #[test]
    fn slice_range_half_open() {
        let store = TimeSeriesStore::new(Resolution::H1, hourly_bars(10)).unwrap();
        let t0 = store.first_timestamp().unwrap();
        let slice = store.slice_range(t0 + Duration::hours(2), t0 + Duration::hours(5));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].timestamp, t0 + Duration::hours(2));
        assert_eq!(slice.last().unwrap().timestamp, t0 + Duration::hours(4));
    }

    #[test]
    fn slice_range_beyond_data_clamps() {
        let store = TimeSeriesStore::new(Resolution::H1, hourly_bars(4)).unwrap();
        let t0 = store.first_timestamp().unwrap();
        let slice = store.slice_range(t0 + Duration::hours(2), t0 + Duration::days(30));
        assert_eq!(slice.len(), 2);
    }

    #[test]
    fn slice_range_inverted_is_empty() {
        let store = TimeSeriesStore::new(Resolution::H1, hourly_bars(4)).unwrap();
        let t0 = store.first_timestamp().unwrap();
        let slice = store.slice_range(t0 + Duration::hours(3), t0 + Duration::hours(1));
        assert!(slice.is_empty());
    }
}

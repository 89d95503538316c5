//! Multi-resolution aggregation — derive higher-resolution bars from a base series.
//!
//! Grouping is by period key: one derived bar per distinct non-empty period,
//! in time order. Derived open = first base open, close = last base close,
//! high/low = extremes over the group, volume = sum. Each derived bar
//! remembers the contiguous base index range it covers; that mapping is what
//! the aligned view uses to keep lookbacks leak-free.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::resolution::Resolution;

/// Policy for the final period group at series end.
///
/// Whether the trailing period is actually complete cannot be decided from
/// the data alone, so the choice is a configuration flag rather than a
/// heuristic. `Emit` (the default) keeps the trailing group; `Drop` removes
/// it unconditionally, trading a little data for the guarantee that every
/// derived bar covers a full period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrailingPartial {
    #[default]
    Emit,
    Drop,
}

/// Bars aggregated to a coarser resolution, with base index spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub resolution: Resolution,
    pub bars: Vec<Bar>,
    /// Per derived bar: `(first, last)` base indices covered, inclusive.
    /// Spans are contiguous and non-overlapping.
    pub base_spans: Vec<(usize, usize)>,
}

impl DerivedSeries {
    /// Derived bars fully closed before base index `base_index`: every bar
    /// whose last constituent base bar precedes it. A period that contains
    /// `base_index` is still forming and is never returned.
    pub fn bars_closed_before(&self, base_index: usize) -> &[Bar] {
        let n = self.base_spans.partition_point(|&(_, last)| last < base_index);
        &self.bars[..n]
    }
}

/// Aggregate with an arbitrary period boundary function.
///
/// `period_key` must be monotone non-decreasing in time; consecutive bars
/// with equal keys form one derived bar. Empty input yields an empty
/// series, never an error.
pub fn aggregate_by<F>(
    bars: &[Bar],
    resolution: Resolution,
    period_key: F,
    trailing: TrailingPartial,
) -> DerivedSeries
where
    F: Fn(NaiveDateTime) -> i64,
{
    let mut out = Vec::new();
    let mut spans = Vec::new();

    let mut group_start = 0usize;
    while group_start < bars.len() {
        let key = period_key(bars[group_start].timestamp);
        let mut group_end = group_start;
        while group_end + 1 < bars.len() && period_key(bars[group_end + 1].timestamp) == key {
            group_end += 1;
        }

        let group = &bars[group_start..=group_end];
        out.push(Bar {
            timestamp: group[0].timestamp,
            open: group[0].open,
            high: group.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
            low: group.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
            close: group[group.len() - 1].close,
            volume: group.iter().map(|b| b.volume).sum(),
        });
        spans.push((group_start, group_end));

        group_start = group_end + 1;
    }

    if trailing == TrailingPartial::Drop {
        out.pop();
        spans.pop();
    }

    DerivedSeries {
        resolution,
        bars: out,
        base_spans: spans,
    }
}

/// Aggregate base bars to `resolution` using its epoch-aligned period key.
pub fn aggregate(bars: &[Bar], resolution: Resolution, trailing: TrailingPartial) -> DerivedSeries {
    aggregate_by(bars, resolution, |ts| resolution.period_key(ts), trailing)
}

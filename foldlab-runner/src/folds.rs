//! Fold planning — purged and embargoed walk-forward windows.
//!
//! Each fold splits calendar time into four consecutive regions:
//!
//! ```text
//!   [ in-sample ............ ][ purge ][ out-of-sample ][ embargo ]
//!   is_start        is_end_actual    oos_start     oos_end
//! ```
//!
//! The purge gap is removed from the END of the nominal in-sample window so
//! that no lookback computed at an OOS decision bar can reach into data the
//! IS fit actually saw. The embargo gap keeps the NEXT fold's in-sample
//! window from starting right where this fold's OOS ended. Both gaps are
//! sized from the strategy's maximum lookback, converted from bars to
//! calendar time through the base resolution and trading-hours ratio.

use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use foldlab_core::resolution::Resolution;

/// Half-open calendar interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Walk-forward fold mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoldMode {
    /// IS start pinned to the series start; IS grows by `step_months` per fold.
    Anchored,
    /// Fixed-length IS slides forward; the next IS start never precedes the
    /// previous fold's `oos_end + embargo`.
    #[default]
    Rolling,
}

/// One planned fold. The four ranges are consecutive and non-overlapping;
/// `is_range.end` is the post-purge IS boundary (`is_end_actual`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fold {
    pub id: usize,
    pub is_range: TimeRange,
    pub purge_range: TimeRange,
    pub oos_range: TimeRange,
    pub embargo_range: TimeRange,
}

/// Fold-plan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldPlanConfig {
    pub mode: FoldMode,
    /// Nominal in-sample length in months.
    pub is_months: u32,
    /// Out-of-sample length in months.
    pub oos_months: u32,
    /// Forward step per fold in months.
    pub step_months: u32,
    /// Purge gap = this factor × max lookback bars (calendar-converted).
    pub purge_factor: f64,
    /// Embargo gap = this factor × max lookback bars (calendar-converted).
    pub embargo_factor: f64,
    /// Explicit purge size in base bars; overrides the factor when set.
    pub purge_bars_override: Option<usize>,
    /// Explicit embargo size in base bars; overrides the factor when set.
    pub embargo_bars_override: Option<usize>,
    /// Trading hours per calendar day for bar→calendar conversion.
    pub trading_hours_per_day: f64,
    /// Fewer valid folds than this is reported as `TooFewFolds`.
    pub min_folds: usize,
}

impl Default for FoldPlanConfig {
    fn default() -> Self {
        Self {
            mode: FoldMode::Rolling,
            is_months: 12,
            oos_months: 3,
            step_months: 3,
            purge_factor: 1.5,
            embargo_factor: 1.0,
            purge_bars_override: None,
            embargo_bars_override: None,
            trading_hours_per_day: 24.0,
            min_folds: 3,
        }
    }
}

/// Errors from fold planning.
#[derive(Debug, Error)]
pub enum FoldPlanError {
    #[error("step_months must be >= 1")]
    ZeroStep,
    #[error("no folds fit in [{start}, {end}): range shorter than one IS+purge+OOS cycle")]
    NoFolds {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// The partial plan is carried so a caller may deliberately proceed
    /// with fewer folds instead of aborting.
    #[error("only {} folds fit, {required} required", folds.len())]
    TooFewFolds { required: usize, folds: Vec<Fold> },
}

/// Plans purged, embargoed walk-forward folds over a calendar range.
#[derive(Debug, Clone)]
pub struct FoldPlanner {
    config: FoldPlanConfig,
    resolution: Resolution,
    max_lookback_bars: usize,
}

impl FoldPlanner {
    pub fn new(config: FoldPlanConfig, resolution: Resolution, max_lookback_bars: usize) -> Self {
        Self {
            config,
            resolution,
            max_lookback_bars,
        }
    }

    /// Purge gap in calendar time. Never zero: the invariant
    /// `oos_start − is_end_actual ≥ purge > 0` requires at least one bar.
    pub fn purge_gap(&self) -> Duration {
        self.gap(self.config.purge_bars_override, self.config.purge_factor)
    }

    /// Embargo gap in calendar time (may be zero only via explicit override).
    pub fn embargo_gap(&self) -> Duration {
        self.gap(self.config.embargo_bars_override, self.config.embargo_factor)
    }

    fn gap(&self, override_bars: Option<usize>, factor: f64) -> Duration {
        let bars = match override_bars {
            Some(bars) => bars,
            None => (factor * self.max_lookback_bars as f64).ceil().max(1.0) as usize,
        };
        self.resolution
            .bars_to_calendar(bars, self.config.trading_hours_per_day)
    }

    /// Generate all folds over `[start, end)`.
    ///
    /// Termination: planning stops as soon as the next OOS window would
    /// pass `end`; a range shorter than one IS+purge+OOS cycle yields
    /// `NoFolds`, never a crash or a negative-length window.
    pub fn plan(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Fold>, FoldPlanError> {
        if self.config.step_months == 0 {
            return Err(FoldPlanError::ZeroStep);
        }

        let purge = self.purge_gap();
        let embargo = self.embargo_gap();
        let mut folds = Vec::new();
        let mut is_start = start;

        loop {
            let id = folds.len();

            let nominal_is_end = match self.config.mode {
                FoldMode::Anchored => {
                    is_start = start;
                    add_months(start, self.config.is_months + id as u32 * self.config.step_months)
                }
                FoldMode::Rolling => add_months(is_start, self.config.is_months),
            };
            let Some(nominal_is_end) = nominal_is_end else {
                break;
            };

            let oos_start = nominal_is_end;
            let Some(oos_end) = add_months(oos_start, self.config.oos_months) else {
                break;
            };
            if oos_end > end {
                break;
            }

            let is_end_actual = oos_start - purge;
            if is_end_actual <= is_start {
                // Purge would consume the whole in-sample window.
                break;
            }

            folds.push(Fold {
                id,
                is_range: TimeRange::new(is_start, is_end_actual),
                purge_range: TimeRange::new(is_end_actual, oos_start),
                oos_range: TimeRange::new(oos_start, oos_end),
                embargo_range: TimeRange::new(oos_end, oos_end + embargo),
            });

            if self.config.mode == FoldMode::Rolling {
                let stepped = match add_months(is_start, self.config.step_months) {
                    Some(t) => t,
                    None => break,
                };
                is_start = stepped.max(oos_end + embargo);
            }
        }

        if folds.is_empty() {
            return Err(FoldPlanError::NoFolds { start, end });
        }
        if folds.len() < self.config.min_folds {
            return Err(FoldPlanError::TooFewFolds {
                required: self.config.min_folds,
                folds,
            });
        }
        Ok(folds)
    }
}

fn add_months(ts: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    ts.checked_add_months(Months::new(months))
}

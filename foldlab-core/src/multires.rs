//! MultiResolutionSeries — aligned, leak-free views across resolutions.
//!
//! Derived resolutions are aggregated eagerly, once, at construction; the
//! per-bar base index spans then make "what was known at base bar i" a
//! binary search, not a re-aggregation. The decision-time contract is
//! `completed_before`: only bars whose period closed strictly before the
//! decision bar are visible, at every resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{aggregate, DerivedSeries, TrailingPartial};
use crate::domain::Bar;
use crate::resolution::Resolution;
use crate::series::TimeSeriesStore;

/// Errors from multi-resolution construction.
#[derive(Debug, Error)]
pub enum MultiResError {
    #[error("cannot derive {requested:?} from coarser base {base:?}")]
    FinerThanBase {
        requested: Resolution,
        base: Resolution,
    },
}

/// Base series plus eagerly derived coarser resolutions.
#[derive(Debug, Clone)]
pub struct MultiResolutionSeries {
    store: Arc<TimeSeriesStore>,
    derived: BTreeMap<Resolution, DerivedSeries>,
}

impl MultiResolutionSeries {
    /// Aggregate the base store into each requested resolution.
    ///
    /// The base resolution itself may appear in `resolutions`; it is served
    /// directly from the store. Trailing partial periods are always kept
    /// internally — a partial bar built from bars at or before "now" is
    /// legitimate history, and `completed_before` hides it until its period
    /// closes.
    pub fn build(
        store: Arc<TimeSeriesStore>,
        resolutions: &[Resolution],
    ) -> Result<Self, MultiResError> {
        let base = store.resolution();
        let mut derived = BTreeMap::new();

        for &res in resolutions {
            if res < base {
                return Err(MultiResError::FinerThanBase {
                    requested: res,
                    base,
                });
            }
            if res != base {
                derived.insert(res, aggregate(store.bars(), res, TrailingPartial::Emit));
            }
        }

        Ok(Self { store, derived })
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn store_arc(&self) -> Arc<TimeSeriesStore> {
        Arc::clone(&self.store)
    }

    pub fn base_resolution(&self) -> Resolution {
        self.store.resolution()
    }

    /// All bars of `resolution` fully closed before base bar `base_index`.
    ///
    /// For the base resolution this is simply `bars[..base_index]`; for
    /// derived resolutions the bar containing `base_index` is still forming
    /// and is excluded. Unknown resolutions return an empty slice.
    pub fn completed_before(&self, resolution: Resolution, base_index: usize) -> &[Bar] {
        if resolution == self.store.resolution() {
            let end = base_index.min(self.store.len());
            return &self.store.bars()[..end];
        }
        match self.derived.get(&resolution) {
            Some(series) => series.bars_closed_before(base_index),
            None => &[],
        }
    }
}

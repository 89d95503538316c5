//! Walk-forward orchestrator — plans folds and evaluates them in parallel.
//!
//! Folds are independent by construction (the store is immutable and every
//! window read is bounded), so they map cleanly onto a rayon pool. One fold
//! failing its preconditions produces a `Failed` outcome in the report; it
//! never aborts the run.
//!
//! Two entry points with different contracts:
//! - [`WfaOrchestrator::run`] treats an unplannable range as a hard error;
//! - [`WfaOrchestrator::run_to_report`] folds that case into a zero-fold
//!   report with `InsufficientData` status, for callers that always want a
//!   report artifact.

use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use foldlab_core::multires::{MultiResError, MultiResolutionSeries};
use foldlab_core::resolution::Resolution;
use foldlab_core::series::TimeSeriesStore;
use foldlab_core::signal_engine::BreakoutEngine;

use crate::backtest::{evaluate_window, select_params, ParamGrid, Selection};
use crate::config::{ConfigError, WfaConfig};
use crate::folds::{Fold, FoldPlanError, FoldPlanner};
use crate::metrics::FoldMetrics;
use crate::report::{FoldOutcome, WfaReport};

/// Errors from running a walk-forward analysis.
#[derive(Debug, Error)]
pub enum WfaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Plan(#[from] FoldPlanError),
    #[error(transparent)]
    Aggregation(#[from] MultiResError),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("series is empty, nothing to analyze")]
    EmptySeries,
}

/// Plans and runs a complete walk-forward analysis over one series.
#[derive(Debug, Clone)]
pub struct WfaOrchestrator {
    config: WfaConfig,
    grid: ParamGrid,
}

impl WfaOrchestrator {
    pub fn new(config: WfaConfig) -> Self {
        Self {
            config,
            grid: ParamGrid::default(),
        }
    }

    /// Replace the default in-sample sweep grid.
    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn config(&self) -> &WfaConfig {
        &self.config
    }

    /// Run the analysis; an unplannable calendar range is a hard error.
    pub fn run(&self, store: Arc<TimeSeriesStore>) -> Result<WfaReport, WfaError> {
        self.config.validate()?;

        let base = store.resolution();
        let (start, end) = match (store.first_timestamp(), store.last_timestamp()) {
            (Some(first), Some(last)) => (first, last + base.duration()),
            _ => return Err(WfaError::EmptySeries),
        };

        let resolutions: Vec<Resolution> = self
            .config
            .strategy
            .lookbacks
            .iter()
            .map(|lb| lb.resolution)
            .collect();
        let series = MultiResolutionSeries::build(Arc::clone(&store), &resolutions)?;

        let lookback = self.config.strategy.max_lookback_bars(base);
        let planner = FoldPlanner::new(self.config.folds.clone(), base, lookback);
        let folds = match planner.plan(start, end) {
            Ok(folds) => folds,
            Err(FoldPlanError::TooFewFolds { required, folds })
                if self.config.run.allow_partial =>
            {
                warn!(
                    planned = folds.len(),
                    required, "proceeding with a partial fold plan"
                );
                folds
            }
            Err(err) => return Err(err.into()),
        };

        let threads = self.worker_threads();
        info!(
            folds = folds.len(),
            threads,
            lookback_bars = lookback,
            "starting walk-forward run"
        );

        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        let outcomes: Vec<FoldOutcome> = pool.install(|| {
            folds
                .par_iter()
                .map(|fold| self.run_fold(&series, fold))
                .collect()
        });

        let report = WfaReport::from_outcomes(outcomes, self.config.validation.alpha);
        info!(
            done = report.done_folds,
            failed = report.failed_folds,
            p_value = report.validation.p_value,
            "walk-forward run finished"
        );
        Ok(report)
    }

    /// Run the analysis, folding recoverable "not enough data" conditions
    /// into a zero-fold `InsufficientData` report.
    pub fn run_to_report(&self, store: Arc<TimeSeriesStore>) -> Result<WfaReport, WfaError> {
        let alpha = self.config.validation.alpha;
        match self.run(store) {
            Ok(report) => Ok(report),
            Err(WfaError::EmptySeries) => Ok(WfaReport::insufficient_data(
                "series is empty, nothing to analyze".into(),
                alpha,
            )),
            Err(WfaError::Plan(err)) => Ok(WfaReport::insufficient_data(err.to_string(), alpha)),
            Err(err) => Err(err),
        }
    }

    /// One fold end to end: precondition checks, IS selection, OOS walk.
    fn run_fold(&self, series: &MultiResolutionSeries, fold: &Fold) -> FoldOutcome {
        let store = series.store();
        let run = &self.config.run;

        let (is_lo, is_hi) = store.index_range(fold.is_range.start, fold.is_range.end);
        let is_bars = is_hi - is_lo;
        if is_bars < run.min_is_bars {
            warn!(fold = fold.id, is_bars, "fold failed in-sample precondition");
            return FoldOutcome::failed(
                fold.clone(),
                format!(
                    "in-sample window holds {is_bars} bars, {} required",
                    run.min_is_bars
                ),
            );
        }

        let (oos_lo, oos_hi) = store.index_range(fold.oos_range.start, fold.oos_range.end);
        let oos_bars = oos_hi - oos_lo;
        if oos_bars < run.min_oos_bars {
            warn!(fold = fold.id, oos_bars, "fold failed out-of-sample precondition");
            return FoldOutcome::failed(
                fold.clone(),
                format!(
                    "out-of-sample window holds {oos_bars} bars, {} required",
                    run.min_oos_bars
                ),
            );
        }

        let max_holding = self.config.simulation.max_holding_bars;
        let selection = if run.optimize_in_sample {
            select_params(
                series,
                &self.config.strategy,
                &self.grid,
                fold.is_range,
                max_holding,
            )
        } else {
            let engine = BreakoutEngine::new(self.config.strategy.clone());
            Selection {
                params: self.config.strategy.clone(),
                is_trades: evaluate_window(series, &engine, fold.is_range, max_holding),
            }
        };

        let engine = BreakoutEngine::new(selection.params.clone());
        let oos_trades = evaluate_window(series, &engine, fold.oos_range, max_holding);

        debug!(
            fold = fold.id,
            is_trades = selection.is_trades.len(),
            oos_trades = oos_trades.len(),
            "fold evaluated"
        );

        FoldOutcome::done(
            fold.clone(),
            selection.params,
            FoldMetrics::compute(&selection.is_trades),
            FoldMetrics::compute(&oos_trades),
        )
    }

    fn worker_threads(&self) -> usize {
        match self.config.run.threads {
            Some(n) => n.max(1),
            // Leave one core for the host process
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2)
                .saturating_sub(1)
                .max(1),
        }
    }
}

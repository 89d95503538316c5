//! Window evaluation — one strategy over one calendar window, plus the
//! in-sample parameter sweep.
//!
//! The evaluator enforces two fold-level disciplines the engine itself
//! cannot see:
//! - positions never overlap: while a trade is open, later decision bars
//!   in the window are skipped;
//! - forward walks are clipped at the window end, so an OOS trade can
//!   never resolve against bars inside the embargo region.

use serde::{Deserialize, Serialize};

use foldlab_core::domain::Trade;
use foldlab_core::multires::MultiResolutionSeries;
use foldlab_core::signal_engine::{BreakoutEngine, StrategyParams};
use foldlab_core::simulator::simulate;

use crate::folds::TimeRange;

/// Evaluate a strategy over `[range.start, range.end)`.
///
/// Decision bars are scanned in order; each signal is walked forward with
/// bars clipped to the window end, and the scan resumes strictly after the
/// exit bar. Trades come back in chronological order.
pub fn evaluate_window(
    series: &MultiResolutionSeries,
    engine: &BreakoutEngine,
    range: TimeRange,
    max_holding_bars: usize,
) -> Vec<Trade> {
    let store = series.store();
    let (lo, hi) = store.index_range(range.start, range.end);

    let mut trades = Vec::new();
    let mut index = lo;
    while index < hi {
        match engine.evaluate(series, index) {
            Some(signal) => {
                let forward = &store.bars()[index + 1..hi];
                let trade = simulate(&signal, forward, max_holding_bars);
                // Resume after the exit bar; a degenerate zero-bar trade
                // still advances past its origin.
                index += trade.holding_bars + 1;
                trades.push(trade);
            }
            None => index += 1,
        }
    }
    trades
}

// ─── In-sample parameter sweep ──────────────────────────────────────

/// Candidate axes for the in-sample sweep.
///
/// Channel candidates are fractions of the CONFIGURED lookback, never
/// multiples: the purge gap was sized from the configured maximum, so a
/// sweep that grew the lookback past it would quietly re-open the leak the
/// purge exists to close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    /// Channel-length scales in (0, 1], applied to every configured lookback.
    pub channel_scales: Vec<f64>,
    /// Breakout margin candidates, in price units.
    pub breakout_margins: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            channel_scales: vec![0.5, 0.75, 1.0],
            breakout_margins: vec![0.0, 0.1, 0.25],
        }
    }
}

impl ParamGrid {
    /// Expand into concrete parameter sets, configured set first.
    pub fn expand(&self, base: &StrategyParams) -> Vec<StrategyParams> {
        let mut candidates = vec![base.clone()];
        for &scale in &self.channel_scales {
            let scale = scale.clamp(f64::EPSILON, 1.0);
            for &margin in &self.breakout_margins {
                let mut params = base.clone();
                for lb in &mut params.lookbacks {
                    lb.bars = ((lb.bars as f64 * scale).round() as usize).max(1);
                }
                params.breakout_margin = margin;
                if !candidates.contains(&params) {
                    candidates.push(params);
                }
            }
        }
        candidates
    }
}

/// Outcome of the in-sample sweep: the chosen parameters and the trades
/// they produced on the in-sample window.
#[derive(Debug, Clone)]
pub struct Selection {
    pub params: StrategyParams,
    pub is_trades: Vec<Trade>,
}

/// Pick the grid candidate with the highest in-sample total pnl.
///
/// Reads nothing outside `is_range`. Ties keep the earlier candidate, so
/// the configured parameter set wins any dead heat.
pub fn select_params(
    series: &MultiResolutionSeries,
    base: &StrategyParams,
    grid: &ParamGrid,
    is_range: TimeRange,
    max_holding_bars: usize,
) -> Selection {
    let mut best: Option<(f64, Selection)> = None;

    for params in grid.expand(base) {
        let engine = BreakoutEngine::new(params.clone());
        let trades = evaluate_window(series, &engine, is_range, max_holding_bars);
        let pnl: f64 = trades.iter().map(|t| t.pnl).sum();

        let better = match &best {
            None => true,
            Some((best_pnl, _)) => pnl > *best_pnl,
        };
        if better {
            best = Some((
                pnl,
                Selection {
                    params,
                    is_trades: trades,
                },
            ));
        }
    }

    // expand() always yields at least the base candidate
    best.map(|(_, sel)| sel).unwrap_or_else(|| Selection {
        params: base.clone(),
        is_trades: Vec::new(),
    })
}

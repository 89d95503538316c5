//! Performance metrics — pure functions from a trade set to summary statistics.
//!
//! Every metric is a pure function: trades in, scalar out. Arithmetic edge
//! cases resolve to documented fallback values, never errors:
//! - profit factor is 0.0 when both gross sides are zero, and capped at the
//!   100.0 sentinel when there are profits but no losses;
//! - Sharpe is 0.0 with fewer than 2 trades or zero pnl variance.

use serde::{Deserialize, Serialize};

use foldlab_core::domain::Trade;

/// Sentinel for a profit factor with gross profit but zero gross loss.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Summary statistics for one evaluation window (IS or OOS side of a fold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub total_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_pnl: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub avg_holding_bars: f64,
}

impl FoldMetrics {
    /// Compute all metrics from a trade list in chronological order.
    pub fn compute(trades: &[Trade]) -> Self {
        Self {
            total_trades: trades.len(),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            max_drawdown: max_drawdown(trades),
            sharpe: sharpe(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            avg_holding_bars: avg_holding_bars(trades),
        }
    }

    /// Metrics for a window that produced no trades.
    pub fn empty() -> Self {
        Self::compute(&[])
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with positive pnl.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Gross profit / gross loss.
///
/// Both sides zero → 0.0. Zero loss with positive profit → the
/// `PROFIT_FACTOR_CAP` sentinel, so "never lost" reads as strong but
/// finite rather than silently collapsing to zero.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-12 {
        return if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

/// Maximum drawdown of the cumulative-pnl equity curve, in price units.
///
/// Builds the curve in strict trade order, tracks the running peak, and
/// reports the deepest peak-to-trough distance as a non-negative number.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        cumulative += trade.pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = peak - cumulative;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Per-trade Sharpe: mean(pnl) / std(pnl). 0.0 with < 2 trades or zero std.
pub fn sharpe(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let mean = mean_f64(&pnls);
    let std = std_dev(&pnls);
    if std < 1e-15 {
        return 0.0;
    }
    mean / std
}

/// Mean pnl over winning trades; 0.0 without winners.
pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).collect();
    mean_f64(&wins)
}

/// Mean pnl over losing trades (negative); 0.0 without losers.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter(|t| t.pnl < 0.0).map(|t| t.pnl).collect();
    mean_f64(&losses)
}

/// Mean holding period in bars.
pub fn avg_holding_bars(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.holding_bars as f64).sum::<f64>() / trades.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

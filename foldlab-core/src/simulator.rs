//! Trade simulator — walks a signal forward to a realized outcome.
//!
//! Look-ahead discipline: the walk starts strictly AFTER the bar that
//! produced the signal; the signal bar's own extremes never resolve its own
//! outcome. Within each forward bar the checks run in a fixed order —
//! adverse extreme vs. stop first, then favorable extreme vs. target. When
//! both levels are breached inside one bar the stop wins: intrabar ordering
//! is unknowable from OHLC alone, so the conservative reading is mandatory,
//! not a coin flip.

use crate::domain::{Bar, Direction, ExitReason, Signal, Trade};

/// Simulate a signal against forward bars.
///
/// `forward_bars` must begin at the bar immediately after the signal's
/// origin bar. The walk is bounded by `max_holding_bars`; if neither level
/// is touched by then, the trade closes at the last walked bar's close
/// (`TimeExit`).
///
/// Zero forward bars is a degenerate case, not an error: the trade closes
/// at entry with zero pnl so downstream aggregation stays well-defined.
pub fn simulate(signal: &Signal, forward_bars: &[Bar], max_holding_bars: usize) -> Trade {
    let entry_price = signal.origin_price;

    if forward_bars.is_empty() || max_holding_bars == 0 {
        return Trade {
            signal: signal.clone(),
            entry_price,
            exit_price: entry_price,
            exit_reason: ExitReason::TimeExit,
            pnl: 0.0,
            holding_bars: 0,
        };
    }

    let horizon = forward_bars.len().min(max_holding_bars);

    for (held, bar) in forward_bars[..horizon].iter().enumerate() {
        let (stopped, targeted) = match signal.direction {
            Direction::Long => (bar.low <= signal.stop_loss, bar.high >= signal.take_profit),
            Direction::Short => (bar.high >= signal.stop_loss, bar.low <= signal.take_profit),
        };

        if stopped {
            // Stop checked first; same-bar double breach resolves to the stop.
            return close(signal, entry_price, signal.stop_loss, ExitReason::StopLoss, held + 1);
        }
        if targeted {
            return close(
                signal,
                entry_price,
                signal.take_profit,
                ExitReason::TakeProfit,
                held + 1,
            );
        }
    }

    let last = &forward_bars[horizon - 1];
    close(signal, entry_price, last.close, ExitReason::TimeExit, horizon)
}

fn close(
    signal: &Signal,
    entry_price: f64,
    exit_price: f64,
    exit_reason: ExitReason,
    holding_bars: usize,
) -> Trade {
    let pnl = signal.direction.sign() * (exit_price - entry_price);
    Trade {
        signal: signal.clone(),
        entry_price,
        exit_price,
        exit_reason,
        pnl,
        holding_bars,
    }
}

//! Trade — a realized round-trip outcome produced by the simulator.

use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Why a simulated trade closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    TimeExit,
}

/// A completed round-trip trade: created once by the simulator, never mutated.
///
/// Pnl is per unit of the instrument (exit − entry, direction-signed); the
/// engine takes no position-sizing stance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub signal: Signal,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pnl: f64,
    /// Number of forward bars walked before the exit bar, inclusive.
    pub holding_bars: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, VolRegime};
    use chrono::NaiveDate;

    fn sample_trade(pnl: f64) -> Trade {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Trade {
            signal: Signal {
                timestamp: ts,
                origin_index: 42,
                direction: Direction::Long,
                origin_price: 100.0,
                stop_loss: 97.0,
                take_profit: 106.0,
                breakout_margin: 0.8,
                atr: 2.0,
                volatility: VolRegime::Normal,
            },
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            exit_reason: ExitReason::TakeProfit,
            pnl,
            holding_bars: 6,
        }
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade(6.0).is_winner());
        assert!(!sample_trade(-3.0).is_winner());
        assert!(!sample_trade(0.0).is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade(6.0);
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}

//! Signal — a directional breakout decision with attached risk levels.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Sign multiplier for pnl arithmetic: +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// Ordinal volatility regime from percentile-ranked ATR.
///
/// The breakout engine suppresses signals in the two extreme buckets:
/// `Dormant` markets produce false breakouts from noise alone, `Chaotic`
/// markets blow through stops before the move resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolRegime {
    Dormant,
    Quiet,
    Normal,
    Active,
    Chaotic,
}

impl VolRegime {
    /// Bucket a percentile rank in [0, 1] into one of five regimes.
    pub fn from_percentile(rank: f64) -> Self {
        match rank {
            r if r < 0.2 => VolRegime::Dormant,
            r if r < 0.4 => VolRegime::Quiet,
            r if r < 0.6 => VolRegime::Normal,
            r if r < 0.8 => VolRegime::Active,
            _ => VolRegime::Chaotic,
        }
    }

    /// Whether the breakout engine trades in this regime.
    pub fn is_tradeable(&self) -> bool {
        !matches!(self, VolRegime::Dormant | VolRegime::Chaotic)
    }
}

/// A breakout signal, produced once by the engine and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    /// Index of the originating bar in the base series.
    pub origin_index: usize,
    pub direction: Direction,
    /// Close of the originating bar; entry reference for the simulator.
    pub origin_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// How far beyond the binding breakout level price closed, in price units.
    pub breakout_margin: f64,
    /// ATR at signal time, in price units.
    pub atr: f64,
    pub volatility: VolRegime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sign() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
    }

    #[test]
    fn regime_buckets_cover_unit_interval() {
        assert_eq!(VolRegime::from_percentile(0.0), VolRegime::Dormant);
        assert_eq!(VolRegime::from_percentile(0.25), VolRegime::Quiet);
        assert_eq!(VolRegime::from_percentile(0.5), VolRegime::Normal);
        assert_eq!(VolRegime::from_percentile(0.7), VolRegime::Active);
        assert_eq!(VolRegime::from_percentile(1.0), VolRegime::Chaotic);
    }

    #[test]
    fn extreme_regimes_not_tradeable() {
        assert!(!VolRegime::Dormant.is_tradeable());
        assert!(!VolRegime::Chaotic.is_tradeable());
        assert!(VolRegime::Quiet.is_tradeable());
        assert!(VolRegime::Normal.is_tradeable());
        assert!(VolRegime::Active.is_tradeable());
    }
}

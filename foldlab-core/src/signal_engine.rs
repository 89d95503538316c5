//! Breakout signal engine — stateless rule from bar history to signal.
//!
//! A signal requires unanimity: every configured resolution must agree on
//! the direction, each judged by its own trailing high/low channel over
//! completed bars only. Majority is not enough — a lone dissenting
//! resolution vetoes the signal.
//!
//! Risk refinement: trailing ATR classified by percentile rank against a
//! longer window into five ordinal regimes; the two extreme regimes are
//! untradeable. Stop and target are entry ∓/± ATR × configured multiples.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Direction, Signal, VolRegime};
use crate::indicators::{highest_high, lowest_low, percentile_rank, rolling_atr};
use crate::multires::MultiResolutionSeries;
use crate::resolution::Resolution;

/// Trailing channel length for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionLookback {
    pub resolution: Resolution,
    pub bars: usize,
}

/// Strategy parameters for the breakout engine.
///
/// Serializable so a run configuration (and an IS-selected parameter set)
/// can be recorded in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Channel lookbacks, one per configured resolution.
    pub lookbacks: Vec<ResolutionLookback>,
    /// Minimum breakout distance beyond the channel, in price units.
    pub breakout_margin: f64,
    /// ATR period, in base-resolution bars.
    pub atr_period: usize,
    /// Stop distance = ATR × this multiple.
    pub atr_stop_mult: f64,
    /// Target distance = ATR × this multiple.
    pub atr_target_mult: f64,
    /// History window (base bars) the current ATR is percentile-ranked against.
    pub vol_window: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            lookbacks: vec![ResolutionLookback {
                resolution: Resolution::H1,
                bars: 20,
            }],
            breakout_margin: 0.0,
            atr_period: 14,
            atr_stop_mult: 2.0,
            atr_target_mult: 3.0,
            vol_window: 100,
        }
    }
}

impl StrategyParams {
    /// Longest lookback expressed in base-resolution bars.
    ///
    /// Drives purge/embargo sizing: a gap of at least this many base bars
    /// separates what IS fitting saw from what OOS decisions can see.
    pub fn max_lookback_bars(&self, base: Resolution) -> usize {
        let channel = self
            .lookbacks
            .iter()
            .map(|lb| {
                let scale = (lb.resolution.seconds() / base.seconds()).max(1) as usize;
                lb.bars * scale
            })
            .max()
            .unwrap_or(0);
        channel.max(self.atr_period + self.vol_window)
    }
}

/// Stateless breakout rule: evaluate one decision bar against aligned views.
#[derive(Debug, Clone)]
pub struct BreakoutEngine {
    params: StrategyParams,
}

impl BreakoutEngine {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Evaluate the decision bar at `index` in the base series.
    ///
    /// Returns None when history is too short, resolutions disagree, the
    /// breakout margin is not met, or the volatility regime is untradeable.
    /// Only bars completed strictly before `index` feed the channels; the
    /// decision bar contributes nothing but its close.
    pub fn evaluate(&self, series: &MultiResolutionSeries, index: usize) -> Option<Signal> {
        let bar = series.store().get(index)?;
        let price = bar.close;

        let mut direction: Option<Direction> = None;
        let mut binding_resistance = f64::NEG_INFINITY;
        let mut binding_support = f64::INFINITY;

        for lb in &self.params.lookbacks {
            let view = series.completed_before(lb.resolution, index);
            if view.len() < lb.bars {
                return None;
            }
            let window = &view[view.len() - lb.bars..];
            let resistance = highest_high(window)?;
            let support = lowest_low(window)?;
            binding_resistance = binding_resistance.max(resistance);
            binding_support = binding_support.min(support);

            let here = if price > resistance + self.params.breakout_margin {
                Direction::Long
            } else if price < support - self.params.breakout_margin {
                Direction::Short
            } else {
                return None;
            };

            match direction {
                None => direction = Some(here),
                Some(agreed) if agreed == here => {}
                Some(_) => return None, // resolutions disagree
            }
        }

        let direction = direction?;

        // The binding level is the tightest constraint across resolutions:
        // the maximum resistance for longs, the minimum support for shorts.
        let breakout_margin = match direction {
            Direction::Long => {
                if price <= binding_resistance + self.params.breakout_margin {
                    return None;
                }
                price - binding_resistance
            }
            Direction::Short => {
                if price >= binding_support - self.params.breakout_margin {
                    return None;
                }
                binding_support - price
            }
        };

        let (atr, volatility) = self.classify_volatility(series.store().bars(), index)?;
        if !volatility.is_tradeable() {
            return None;
        }

        let sign = direction.sign();
        Some(Signal {
            timestamp: bar.timestamp,
            origin_index: index,
            direction,
            origin_price: price,
            stop_loss: price - sign * atr * self.params.atr_stop_mult,
            take_profit: price + sign * atr * self.params.atr_target_mult,
            breakout_margin,
            atr,
            volatility,
        })
    }

    /// ATR at `index` and its regime vs. the trailing `vol_window` of ATRs.
    ///
    /// Works on a bounded tail slice so cost per decision is O(window), not
    /// O(series).
    fn classify_volatility(&self, bars: &[Bar], index: usize) -> Option<(f64, VolRegime)> {
        let period = self.params.atr_period;
        let start = (index + 1).saturating_sub(self.params.vol_window + period + 1);
        let tail = &bars[start..=index];

        let series = rolling_atr(tail, period);
        let current = *series.last()?;
        if current.is_nan() {
            return None;
        }

        let history: Vec<f64> = series.iter().copied().filter(|v| !v.is_nan()).collect();
        let rank = percentile_rank(&history, current);
        Some((current, VolRegime::from_percentile(rank)))
    }
}

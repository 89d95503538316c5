//! Run configuration — TOML-loadable settings for a walk-forward run.
//!
//! Every section has defaults, so an empty TOML document is a valid (if
//! opinionated) configuration. `WfaConfig::validate` catches contradictory
//! settings up front, before any fold is planned.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use foldlab_core::signal_engine::StrategyParams;

use crate::folds::FoldPlanConfig;

/// Errors loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Trade simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum holding period in base bars before a forced time exit.
    pub max_holding_bars: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_holding_bars: 48,
        }
    }
}

/// Statistical validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Significance threshold for the OOS mean test; must lie in (0, 1).
    pub alpha: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

/// Execution settings for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker threads; `None` leaves one core free for the host.
    pub threads: Option<usize>,
    /// Proceed with fewer than `min_folds` folds instead of aborting.
    pub allow_partial: bool,
    /// A fold whose IS window holds fewer base bars than this fails.
    pub min_is_bars: usize,
    /// A fold whose OOS window holds fewer base bars than this fails.
    pub min_oos_bars: usize,
    /// Select strategy parameters per fold from the IS grid; when false the
    /// configured parameters are used as-is for every fold.
    pub optimize_in_sample: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: None,
            allow_partial: false,
            min_is_bars: 100,
            min_oos_bars: 20,
            optimize_in_sample: true,
        }
    }
}

/// Complete walk-forward run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WfaConfig {
    pub strategy: StrategyParams,
    pub folds: FoldPlanConfig,
    pub simulation: SimulationConfig,
    pub validation: ValidationConfig,
    pub run: RunConfig,
}

impl WfaConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Reject contradictory settings before any work happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.strategy.lookbacks.is_empty() {
            return invalid("strategy.lookbacks must name at least one resolution".into());
        }
        for lb in &self.strategy.lookbacks {
            if lb.bars == 0 {
                return invalid(format!(
                    "strategy lookback for {:?} must be at least 1 bar",
                    lb.resolution
                ));
            }
        }
        if self.strategy.breakout_margin < 0.0 {
            return invalid(format!(
                "strategy.breakout_margin must be >= 0, got {}",
                self.strategy.breakout_margin
            ));
        }
        if self.strategy.atr_period == 0 {
            return invalid("strategy.atr_period must be at least 1".into());
        }
        if self.strategy.atr_stop_mult <= 0.0 || self.strategy.atr_target_mult <= 0.0 {
            return invalid("strategy ATR multiples must be positive".into());
        }
        if self.strategy.vol_window == 0 {
            return invalid("strategy.vol_window must be at least 1".into());
        }

        if self.folds.is_months == 0 || self.folds.oos_months == 0 {
            return invalid("folds.is_months and folds.oos_months must be at least 1".into());
        }
        if self.folds.step_months == 0 {
            return invalid("folds.step_months must be at least 1".into());
        }
        if self.folds.purge_factor <= 0.0 && self.folds.purge_bars_override.is_none() {
            return invalid("folds.purge_factor must be positive (or set an override)".into());
        }
        if self.folds.embargo_factor < 0.0 {
            return invalid("folds.embargo_factor must be >= 0".into());
        }
        if self.folds.trading_hours_per_day <= 0.0 || self.folds.trading_hours_per_day > 24.0 {
            return invalid(format!(
                "folds.trading_hours_per_day must be in (0, 24], got {}",
                self.folds.trading_hours_per_day
            ));
        }
        if self.folds.min_folds == 0 {
            return invalid("folds.min_folds must be at least 1".into());
        }

        if self.simulation.max_holding_bars == 0 {
            return invalid("simulation.max_holding_bars must be at least 1".into());
        }

        let alpha = self.validation.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return invalid(format!(
                "validation.alpha must lie strictly between 0 and 1, got {alpha}"
            ));
        }

        if let Some(0) = self.run.threads {
            return invalid("run.threads must be at least 1 when set".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldlab_core::resolution::Resolution;

    #[test]
    fn empty_toml_is_the_default_config() {
        let config = WfaConfig::from_toml_str("").unwrap();
        assert_eq!(config, WfaConfig::default());
        assert_eq!(config.validation.alpha, 0.05);
        assert_eq!(config.folds.is_months, 12);
    }

    #[test]
    fn full_document_round_trips() {
        let toml = r#"
            [strategy]
            breakout_margin = 0.5
            atr_period = 10
            atr_stop_mult = 1.5
            atr_target_mult = 2.5
            vol_window = 50

            [[strategy.lookbacks]]
            resolution = "H1"
            bars = 24

            [[strategy.lookbacks]]
            resolution = "H4"
            bars = 12

            [folds]
            mode = "ANCHORED"
            is_months = 18
            oos_months = 2
            step_months = 2
            purge_factor = 2.0
            embargo_factor = 0.5
            trading_hours_per_day = 6.5
            min_folds = 4

            [simulation]
            max_holding_bars = 72

            [validation]
            alpha = 0.01

            [run]
            threads = 4
            allow_partial = true
            min_is_bars = 200
            min_oos_bars = 40
            optimize_in_sample = false
        "#;
        let config = WfaConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.strategy.lookbacks.len(), 2);
        assert_eq!(config.strategy.lookbacks[1].resolution, Resolution::H4);
        assert_eq!(config.folds.min_folds, 4);
        assert_eq!(config.run.threads, Some(4));
        assert!(!config.run.optimize_in_sample);

        let serialized = toml::to_string(&config).unwrap();
        let reparsed = WfaConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(config, reparsed);
    }

    #[test]
    fn rejects_empty_lookbacks() {
        let toml = r#"
            [strategy]
            lookbacks = []
        "#;
        let err = WfaConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_bar_lookback() {
        let toml = r#"
            [[strategy.lookbacks]]
            resolution = "H1"
            bars = 0
        "#;
        assert!(WfaConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn rejects_negative_margin() {
        let toml = r#"
            [strategy]
            breakout_margin = -0.1
        "#;
        assert!(WfaConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn rejects_zero_step() {
        let toml = r#"
            [folds]
            step_months = 0
        "#;
        assert!(WfaConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        for bad in ["alpha = 0.0", "alpha = 1.0", "alpha = 1.5"] {
            let toml = format!("[validation]\n{bad}\n");
            assert!(
                WfaConfig::from_toml_str(&toml).is_err(),
                "should reject {bad}"
            );
        }
    }

    #[test]
    fn rejects_zero_threads() {
        let toml = r#"
            [run]
            threads = 0
        "#;
        assert!(WfaConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn parse_error_is_distinguishable() {
        let err = WfaConfig::from_toml_str("not valid toml [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

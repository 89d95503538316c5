//! FoldLab Runner — walk-forward orchestration over `foldlab-core`.
//!
//! This crate builds on `foldlab-core` to provide:
//! - Purged and embargoed fold planning (anchored and rolling)
//! - Window evaluation with non-overlapping positions
//! - In-sample parameter sweep, out-of-sample verification
//! - Parallel fold execution on a rayon pool
//! - Performance metrics and statistical validation
//! - A serializable run report

pub mod backtest;
pub mod config;
pub mod folds;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod stats;

pub use backtest::{evaluate_window, select_params, ParamGrid, Selection};
pub use config::{ConfigError, RunConfig, SimulationConfig, ValidationConfig, WfaConfig};
pub use folds::{Fold, FoldMode, FoldPlanConfig, FoldPlanError, FoldPlanner, TimeRange};
pub use metrics::{FoldMetrics, PROFIT_FACTOR_CAP};
pub use orchestrator::{WfaError, WfaOrchestrator};
pub use report::{FoldOutcome, FoldStatus, RunStatus, WfaReport};
pub use stats::{MeanTest, TestMethod, WfaValidation};

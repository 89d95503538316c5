//! FoldLab Core — engine side of the walk-forward analysis pipeline.
//!
//! This crate contains everything that touches individual bars:
//! - Domain types (bars, signals, trades)
//! - Validated immutable time-series storage with range queries
//! - Multi-resolution aggregation with leak-free aligned views
//! - Indicator primitives (true range, ATR, rolling extremes)
//! - The multi-resolution breakout signal engine
//! - The forward-walking trade simulator
//! - Seeded synthetic series for tests
//!
//! Fold planning, parallel orchestration, and statistics live in
//! `foldlab-runner`.

pub mod aggregate;
pub mod domain;
pub mod indicators;
pub mod multires;
pub mod resolution;
pub mod series;
pub mod signal_engine;
pub mod simulator;
pub mod synthetic;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across fold workers is Send + Sync.
    ///
    /// The orchestrator hands an `Arc<TimeSeriesStore>` and a
    /// `MultiResolutionSeries` to a rayon pool; if any of these types loses
    /// Send/Sync the build breaks here first.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<series::TimeSeriesStore>();
        require_sync::<series::TimeSeriesStore>();
        require_send::<multires::MultiResolutionSeries>();
        require_sync::<multires::MultiResolutionSeries>();

        require_send::<signal_engine::StrategyParams>();
        require_sync::<signal_engine::StrategyParams>();
        require_send::<signal_engine::BreakoutEngine>();
        require_sync::<signal_engine::BreakoutEngine>();
    }
}

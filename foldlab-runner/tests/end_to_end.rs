//! End-to-end acceptance tests: synthetic scenarios through the full
//! pipeline, from bars to the validated report.
//!
//! Scenarios are seeded and deterministic; every assertion here is about
//! observable report content, not internals.

use std::sync::Arc;

use chrono::Duration;

use foldlab_core::resolution::Resolution;
use foldlab_core::series::TimeSeriesStore;
use foldlab_core::signal_engine::{BreakoutEngine, ResolutionLookback, StrategyParams};
use foldlab_core::synthetic;

use foldlab_runner::{
    evaluate_window, select_params, FoldMetrics, ParamGrid, RunStatus, TestMethod, TimeRange,
    WfaConfig, WfaOrchestrator,
};

fn hourly_store(bars: Vec<foldlab_core::domain::Bar>) -> Arc<TimeSeriesStore> {
    Arc::new(TimeSeriesStore::new(Resolution::H1, bars).unwrap())
}

fn scenario_params() -> StrategyParams {
    StrategyParams {
        lookbacks: vec![ResolutionLookback {
            resolution: Resolution::H1,
            bars: 20,
        }],
        breakout_margin: 0.0,
        atr_period: 14,
        atr_stop_mult: 2.0,
        atr_target_mult: 3.0,
        vol_window: 60,
    }
}

/// A clean 3-ATR breakout at bar 500 with a persistent trend after it:
/// parameters selected on the first 600 bars must find tradeable breakouts
/// in the later out-of-sample window, and the metrics must be well-formed.
#[test]
fn breakout_scenario_trades_out_of_sample() {
    let bars = synthetic::breakout_scenario(1000, 500, 3.0, 17);
    let store = hourly_store(bars);
    let series = foldlab_core::multires::MultiResolutionSeries::build(
        Arc::clone(&store),
        &[Resolution::H1],
    )
    .unwrap();

    let t0 = store.first_timestamp().unwrap();
    let is_range = TimeRange::new(t0, t0 + Duration::hours(600));
    let oos_range = TimeRange::new(t0 + Duration::hours(650), t0 + Duration::hours(1000));

    let selection = select_params(
        &series,
        &scenario_params(),
        &ParamGrid::default(),
        is_range,
        24,
    );

    let engine = BreakoutEngine::new(selection.params.clone());
    let oos_trades = evaluate_window(&series, &engine, oos_range, 24);
    assert!(
        !oos_trades.is_empty(),
        "persistent trend after the break must produce out-of-sample trades"
    );

    let metrics = FoldMetrics::compute(&oos_trades);
    assert_eq!(metrics.total_trades, oos_trades.len());
    assert!(metrics.profit_factor.is_finite());
    assert!(metrics.win_rate >= 0.0 && metrics.win_rate <= 1.0);
    assert!(metrics.max_drawdown >= 0.0);

    // Every OOS decision happened inside the OOS window
    let (oos_lo, oos_hi) = store.index_range(oos_range.start, oos_range.end);
    for trade in &oos_trades {
        assert!(trade.signal.origin_index >= oos_lo);
        assert!(trade.signal.origin_index + trade.holding_bars < oos_hi);
    }
}

/// Empty input is a report, not a crash: zero folds, explicit
/// insufficient-data status, inert validation block.
#[test]
fn empty_series_reports_insufficient_data() {
    let store = hourly_store(Vec::new());
    let orchestrator = WfaOrchestrator::new(WfaConfig::default());

    let report = orchestrator.run_to_report(store).unwrap();
    assert!(matches!(report.status, RunStatus::InsufficientData { .. }));
    assert!(report.folds.is_empty());
    assert_eq!(report.done_folds, 0);
    assert_eq!(report.validation.n_folds, 0);
    assert!(!report.validation.significant);
}

/// Full orchestrated run over two years of data: the report must uphold the
/// fold-plan invariants and serialize losslessly.
#[test]
fn orchestrated_run_upholds_fold_invariants() {
    let bars = synthetic::random_walk(24 * 730, 100.0, 0.02, 0.5, 23);
    let store = hourly_store(bars);

    let mut config = WfaConfig::default();
    config.strategy = scenario_params();
    config.folds.is_months = 6;
    config.folds.oos_months = 2;
    config.folds.step_months = 2;
    config.run.threads = Some(2);

    let orchestrator = WfaOrchestrator::new(config);
    let report = orchestrator.run(store).unwrap();

    assert!(report.is_complete());
    assert!(report.folds.len() >= 3);

    for outcome in &report.folds {
        let fold = &outcome.fold;
        // Purged layout: IS ends strictly before OOS starts
        assert!(fold.is_range.end < fold.oos_range.start);
        assert!(!fold.oos_range.overlaps(&fold.is_range));
        assert_eq!(fold.purge_range.start, fold.is_range.end);
        assert_eq!(fold.purge_range.end, fold.oos_range.start);
    }
    for pair in report.folds.windows(2) {
        // Rolling mode: next IS never starts before the previous embargo ends
        assert!(pair[1].fold.is_range.start >= pair[0].fold.embargo_range.end);
    }

    let json = report.to_json_pretty().unwrap();
    let back: foldlab_runner::WfaReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
}

/// Five folds with identical positive OOS pnl: full consistency, and the
/// documented zero-variance sentinel instead of a numeric blow-up.
#[test]
fn identical_fold_results_hit_the_variance_sentinel() {
    use foldlab_runner::{Fold, FoldOutcome, WfaReport};

    let t0 = synthetic::series_start();
    let outcomes: Vec<FoldOutcome> = (0..5)
        .map(|id| {
            let base = t0 + Duration::days(90 * id as i64);
            let fold = Fold {
                id,
                is_range: TimeRange::new(base, base + Duration::days(180)),
                purge_range: TimeRange::new(base + Duration::days(180), base + Duration::days(185)),
                oos_range: TimeRange::new(base + Duration::days(185), base + Duration::days(245)),
                embargo_range: TimeRange::new(
                    base + Duration::days(245),
                    base + Duration::days(250),
                ),
            };
            let mut is_m = FoldMetrics::empty();
            is_m.total_pnl = 20.0;
            let mut oos_m = FoldMetrics::empty();
            oos_m.total_pnl = 10.0;
            FoldOutcome::done(fold, scenario_params(), is_m, oos_m)
        })
        .collect();

    let report = WfaReport::from_outcomes(outcomes, 0.05);
    assert_eq!(report.validation.n_folds, 5);
    assert_eq!(report.validation.consistency_ratio, 1.0);
    assert_eq!(report.validation.test_method, TestMethod::ZeroVariance);
    assert!(report.validation.t_statistic.is_infinite());
    assert_eq!(report.validation.p_value, 0.0);
    assert!((report.validation.wfa_efficiency - 0.5).abs() < 1e-12);
}

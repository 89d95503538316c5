//! Run report — the serializable record of a walk-forward run.
//!
//! A fold that fails stays in the report as a `Failed` outcome with its
//! reason; it never silently disappears, and it never aborts its siblings.
//! Aggregate statistics are computed over `Done` folds only.

use serde::{Deserialize, Serialize};

use foldlab_core::signal_engine::StrategyParams;

use crate::folds::Fold;
use crate::metrics::FoldMetrics;
use crate::stats::{self, WfaValidation};

/// Overall run status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Folds were planned and evaluated (individual folds may still fail).
    Complete,
    /// The calendar range could not hold the required folds; the report
    /// carries zero folds and a null-effect validation block.
    InsufficientData { reason: String },
}

/// Per-fold status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoldStatus {
    Done,
    Failed,
}

/// The full record of one fold's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldOutcome {
    pub fold: Fold,
    pub status: FoldStatus,
    /// Parameters the OOS window was evaluated with (IS-selected or
    /// configured). Absent on failed folds.
    pub params: Option<StrategyParams>,
    pub is_metrics: Option<FoldMetrics>,
    pub oos_metrics: Option<FoldMetrics>,
    pub failure_reason: Option<String>,
}

impl FoldOutcome {
    pub fn done(
        fold: Fold,
        params: StrategyParams,
        is_metrics: FoldMetrics,
        oos_metrics: FoldMetrics,
    ) -> Self {
        Self {
            fold,
            status: FoldStatus::Done,
            params: Some(params),
            is_metrics: Some(is_metrics),
            oos_metrics: Some(oos_metrics),
            failure_reason: None,
        }
    }

    pub fn failed(fold: Fold, reason: String) -> Self {
        Self {
            fold,
            status: FoldStatus::Failed,
            params: None,
            is_metrics: None,
            oos_metrics: None,
            failure_reason: Some(reason),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == FoldStatus::Done
    }
}

/// Complete walk-forward report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfaReport {
    pub status: RunStatus,
    pub folds: Vec<FoldOutcome>,
    pub done_folds: usize,
    pub failed_folds: usize,
    pub validation: WfaValidation,
}

impl WfaReport {
    /// Assemble a report from fold outcomes, validating over `Done` folds.
    pub fn from_outcomes(outcomes: Vec<FoldOutcome>, alpha: f64) -> Self {
        let done = outcomes.iter().filter(|o| o.is_done()).count();
        let failed = outcomes.len() - done;

        let mut is_pnls = Vec::with_capacity(done);
        let mut oos_pnls = Vec::with_capacity(done);
        for outcome in outcomes.iter().filter(|o| o.is_done()) {
            // Done outcomes always carry both metric blocks
            if let (Some(is_m), Some(oos_m)) = (&outcome.is_metrics, &outcome.oos_metrics) {
                is_pnls.push(is_m.total_pnl);
                oos_pnls.push(oos_m.total_pnl);
            }
        }

        Self {
            status: RunStatus::Complete,
            folds: outcomes,
            done_folds: done,
            failed_folds: failed,
            validation: stats::validate_folds(&is_pnls, &oos_pnls, alpha),
        }
    }

    /// Zero-fold report for a range that cannot hold the required folds.
    pub fn insufficient_data(reason: String, alpha: f64) -> Self {
        Self {
            status: RunStatus::InsufficientData { reason },
            folds: Vec::new(),
            done_folds: 0,
            failed_folds: 0,
            validation: stats::validate_folds(&[], &[], alpha),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Complete)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use crate::folds::TimeRange;
    use crate::stats::TestMethod;

    fn dt(months: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(30 * months as i64)
    }

    fn fold(id: usize) -> Fold {
        Fold {
            id,
            is_range: TimeRange::new(dt(0), dt(6)),
            purge_range: TimeRange::new(dt(6), dt(6) + Duration::days(5)),
            oos_range: TimeRange::new(dt(6) + Duration::days(5), dt(9)),
            embargo_range: TimeRange::new(dt(9), dt(9) + Duration::days(5)),
        }
    }

    fn done_outcome(id: usize, is_pnl: f64, oos_pnl: f64) -> FoldOutcome {
        let mut is_m = FoldMetrics::empty();
        is_m.total_pnl = is_pnl;
        let mut oos_m = FoldMetrics::empty();
        oos_m.total_pnl = oos_pnl;
        FoldOutcome::done(fold(id), StrategyParams::default(), is_m, oos_m)
    }

    #[test]
    fn failed_folds_are_kept_and_counted() {
        let outcomes = vec![
            done_outcome(0, 10.0, 4.0),
            FoldOutcome::failed(fold(1), "in-sample window holds 3 bars, 100 required".into()),
            done_outcome(2, 8.0, -1.0),
        ];
        let report = WfaReport::from_outcomes(outcomes, 0.05);

        assert_eq!(report.folds.len(), 3);
        assert_eq!(report.done_folds, 2);
        assert_eq!(report.failed_folds, 1);
        assert!(report.is_complete());
        // Validation over done folds only: n = 2
        assert_eq!(report.validation.n_folds, 2);
        assert!((report.validation.consistency_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn validation_excludes_failed_folds_from_sums() {
        let outcomes = vec![
            done_outcome(0, 10.0, 5.0),
            done_outcome(1, 10.0, 5.0),
            FoldOutcome::failed(fold(2), "no bars".into()),
        ];
        let report = WfaReport::from_outcomes(outcomes, 0.05);
        assert!((report.validation.wfa_efficiency - 0.5).abs() < 1e-12);
    }

    #[test]
    fn insufficient_data_report_is_inert() {
        let report = WfaReport::insufficient_data("only 1 fold fits, 3 required".into(), 0.05);
        assert!(!report.is_complete());
        assert!(report.folds.is_empty());
        assert_eq!(report.validation.n_folds, 0);
        assert_eq!(report.validation.p_value, 1.0);
        assert!(!report.validation.significant);
        assert_eq!(report.validation.test_method, TestMethod::Underpowered);
    }

    #[test]
    fn report_round_trips_through_json() {
        let outcomes = vec![
            done_outcome(0, 10.0, 4.0),
            FoldOutcome::failed(fold(1), "boom".into()),
        ];
        let report = WfaReport::from_outcomes(outcomes, 0.05);
        let json = report.to_json_pretty().unwrap();
        let back: WfaReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}

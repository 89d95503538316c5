//! Resolution — bar durations and period boundaries.
//!
//! A resolution defines three things:
//! - the calendar duration of one bar,
//! - the period key used to group base bars during aggregation,
//! - the bar→calendar conversion the fold planner uses for purge/embargo gaps.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Supported bar resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    M15,
    H1,
    H4,
    D1,
}

impl Resolution {
    /// Length of one bar in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Resolution::M15 => 15 * 60,
            Resolution::H1 => 3600,
            Resolution::H4 => 4 * 3600,
            Resolution::D1 => 24 * 3600,
        }
    }

    /// Length of one bar as a calendar duration.
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// Period key: which bucket of this resolution a timestamp falls in.
    ///
    /// Buckets are aligned to the Unix epoch, so H4 periods start at
    /// 00:00, 04:00, 08:00, ... and D1 periods at midnight UTC.
    pub fn period_key(&self, ts: NaiveDateTime) -> i64 {
        ts.and_utc().timestamp().div_euclid(self.seconds())
    }

    /// Calendar time covered by `bars` bars of this resolution, stretched
    /// by the trading-hours ratio.
    ///
    /// `trading_hours_per_day` accounts for markets that do not trade around
    /// the clock: 20 H1 bars on a 6.5-hour equity session span roughly
    /// 3 calendar days, not 20 hours. For 24h markets pass 24.0.
    pub fn bars_to_calendar(&self, bars: usize, trading_hours_per_day: f64) -> Duration {
        let ratio = 24.0 / trading_hours_per_day.clamp(0.1, 24.0);
        let secs = (bars as f64 * self.seconds() as f64 * ratio).ceil() as i64;
        Duration::seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn h4_period_boundaries() {
        assert_eq!(Resolution::H4.period_key(ts(0, 0)), Resolution::H4.period_key(ts(3, 59)));
        assert_ne!(Resolution::H4.period_key(ts(3, 59)), Resolution::H4.period_key(ts(4, 0)));
    }

    #[test]
    fn d1_groups_a_full_day() {
        assert_eq!(Resolution::D1.period_key(ts(0, 0)), Resolution::D1.period_key(ts(23, 0)));
        let next_day = ts(0, 0) + Duration::days(1);
        assert_ne!(Resolution::D1.period_key(ts(23, 0)), Resolution::D1.period_key(next_day));
    }

    #[test]
    fn bars_to_calendar_round_clock() {
        // 24h market: 24 H1 bars = exactly one calendar day
        let d = Resolution::H1.bars_to_calendar(24, 24.0);
        assert_eq!(d, Duration::days(1));
    }

    #[test]
    fn bars_to_calendar_session_market() {
        // 6-hour session: 6 H1 bars of trading take a full calendar day
        let d = Resolution::H1.bars_to_calendar(6, 6.0);
        assert_eq!(d, Duration::days(1));
    }

    #[test]
    fn period_keys_monotone_in_time() {
        let mut prev = Resolution::M15.period_key(ts(0, 0));
        for m in 1..=120 {
            let k = Resolution::M15.period_key(ts(0, 0) + Duration::minutes(m));
            assert!(k >= prev);
            prev = k;
        }
    }
}

//! Today's cost and token totals.
//!
//! "Today" is the UTC calendar day containing the supplied clock reading. The
//! window is one-sided: any record updated at or after midnight UTC counts,
//! including records whose timestamp lies in the future.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{DashboardError, Result};
use crate::formatting::DailyCostDisplay;
use crate::models::{DailyAggregate, SessionRecord};

/// Midnight UTC of the day containing `now`, in epoch milliseconds.
pub fn today_start_ms(now: DateTime<Utc>) -> i64 {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

/// Convert an epoch-millisecond clock reading into a UTC timestamp.
///
/// Readings outside chrono's representable range are reported, not clamped.
pub fn now_from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| DashboardError::InvalidTimestamp(ms.to_string()))
}

/// Stateless daily aggregation over a session list.
pub struct DailyCostAggregator;

impl DailyCostAggregator {
    /// Sum today's cost, session count and token counters.
    ///
    /// Pure: the result depends only on `sessions` and `now`.
    pub fn compute(sessions: &[SessionRecord], now: DateTime<Utc>) -> DailyAggregate {
        let today_start = today_start_ms(now);
        sessions
            .iter()
            .filter(|s| s.updated_at >= today_start)
            .fold(DailyAggregate::default(), |mut acc, s| {
                acc.total_cost += s.cost;
                acc.session_count += 1;
                acc.tokens_in_total = acc.tokens_in_total.saturating_add(s.tokens_in);
                acc.tokens_out_total = acc.tokens_out_total.saturating_add(s.tokens_out);
                acc
            })
    }

    /// Today's sessions, in input order.
    pub fn todays_sessions(sessions: &[SessionRecord], now: DateTime<Utc>) -> Vec<&SessionRecord> {
        let today_start = today_start_ms(now);
        sessions
            .iter()
            .filter(|s| s.updated_at >= today_start)
            .collect()
    }

    /// [`Self::compute`] followed by the banner formatting rules.
    pub fn compute_display(
        sessions: &[SessionRecord],
        now: DateTime<Utc>,
    ) -> (DailyAggregate, DailyCostDisplay) {
        let aggregate = Self::compute(sessions, now);
        let display = DailyCostDisplay::from_aggregate(&aggregate);
        (aggregate, display)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

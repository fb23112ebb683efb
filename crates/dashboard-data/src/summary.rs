//! Pre-aggregated usage blocks for the usage summary view.
//!
//! The summary view itself performs no arithmetic; this data-source side
//! reduces the session list into the loose key/value blocks it displays.

use chrono::{DateTime, Duration, Utc};

use dashboard_core::daily::today_start_ms;
use dashboard_core::models::SessionRecord;
use dashboard_core::usage::{NamedUsage, UsageStats};

/// Number of UTC calendar days, today included, in the rolling block.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// Stateless reducer from session records to [`UsageStats`].
pub struct UsageSummarizer;

impl UsageSummarizer {
    /// Sum sessions updated at or after `since` (all sessions when `None`).
    ///
    /// Produces the keys `sessions`, `cost`, `tokens_in` and `tokens_out`.
    pub fn summarize(sessions: &[SessionRecord], since: Option<i64>) -> UsageStats {
        let mut count = 0u64;
        let mut cost = 0.0f64;
        let mut tokens_in = 0u64;
        let mut tokens_out = 0u64;

        for s in sessions
            .iter()
            .filter(|s| since.map_or(true, |cutoff| s.updated_at >= cutoff))
        {
            count += 1;
            cost += s.cost;
            tokens_in = tokens_in.saturating_add(s.tokens_in);
            tokens_out = tokens_out.saturating_add(s.tokens_out);
        }

        UsageStats::new()
            .with("sessions", count)
            .with("cost", cost)
            .with("tokens_in", tokens_in)
            .with("tokens_out", tokens_out)
    }
}

/// Start of the rolling window ending today, in epoch milliseconds.
pub fn rolling_window_start_ms(now: DateTime<Utc>) -> i64 {
    today_start_ms(now) - Duration::days(ROLLING_WINDOW_DAYS - 1).num_milliseconds()
}

/// The two blocks shown side by side: the last seven days and all time.
pub fn default_blocks(sessions: &[SessionRecord], now: DateTime<Utc>) -> [NamedUsage; 2] {
    [
        NamedUsage::new(
            "Last 7 days",
            UsageSummarizer::summarize(sessions, Some(rolling_window_start_ms(now))),
        ),
        NamedUsage::new("All time", UsageSummarizer::summarize(sessions, None)),
    ]
}

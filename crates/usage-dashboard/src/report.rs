//! One-shot JSON report for the `report` view.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use dashboard_core::daily::DailyCostAggregator;
use dashboard_core::formatting::DailyCostDisplay;
use dashboard_core::models::DailyAggregate;
use dashboard_core::usage::{UsageBlockView, UsageSummaryView};
use dashboard_runtime::orchestrator::load_snapshot;

/// Everything the live dashboard shows, as a serialisable document.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub data_path: Option<PathBuf>,
    pub today: TodayReport,
    pub usage: [UsageBlockView; 2],
}

#[derive(Debug, Serialize)]
pub struct TodayReport {
    pub aggregate: DailyAggregate,
    pub display: DailyCostDisplay,
}

/// Load the data once and build the report as of `now`.
pub fn build_report(data_path: Option<&Path>, now: DateTime<Utc>) -> anyhow::Result<Report> {
    let snapshot = load_snapshot(data_path, now)?;
    let (aggregate, display) = DailyCostAggregator::compute_display(&snapshot.sessions, now);
    let usage = UsageSummaryView::render(&snapshot.usage[0], &snapshot.usage[1]);

    Ok(Report {
        generated_at: now,
        data_path: data_path.map(Path::to_path_buf),
        today: TodayReport { aggregate, display },
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_build_report_without_data() {
        let report = build_report(None, now()).unwrap();
        assert_eq!(report.today.aggregate, DailyAggregate::default());
        assert_eq!(report.today.display.cost, "$0.00");
        assert_eq!(report.today.display.sessions, "0 sessions");
        assert_eq!(report.usage[0].title, "Last 7 days");
    }

    #[test]
    fn test_build_report_json_shape() {
        let tmp = TempDir::new().unwrap();
        let today = now().timestamp_millis();
        std::fs::write(
            tmp.path().join("s.jsonl"),
            format!(
                "{{\"id\":\"a\",\"updated_at\":{today},\"cost\":6.0,\"tokens_in\":1500}}\n\
                 {{\"id\":\"b\",\"updated_at\":1,\"cost\":1.0}}\n"
            ),
        )
        .unwrap();

        let report = build_report(Some(tmp.path()), now()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["today"]["aggregate"]["session_count"], 1);
        assert_eq!(json["today"]["display"]["cost"], "$6.00");
        assert_eq!(json["today"]["display"]["band"], "warning");
        assert_eq!(json["today"]["display"]["tokens_in"], "1.5K");
        assert_eq!(json["usage"][1]["title"], "All time");
        assert_eq!(json["usage"][1]["sessions"], "2");
        assert_eq!(json["usage"][1]["cost"], "$7.00");
    }

    #[test]
    fn test_build_report_missing_path_is_error() {
        assert!(build_report(Some(Path::new("/definitely/not/here")), now()).is_err());
    }
}

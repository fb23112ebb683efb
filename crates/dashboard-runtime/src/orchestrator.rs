//! Async refresh orchestrator.
//!
//! Reloads the session list in a tokio task on a fixed interval and on demand,
//! sending [`DashboardSnapshot`]s through an `mpsc` channel so the UI never
//! shares mutable state with the loader.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashboard_core::error::Result;
use dashboard_core::models::SessionRecord;
use dashboard_core::usage::NamedUsage;
use dashboard_data::reader::load_sessions;
use dashboard_data::summary::default_blocks;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

// ── Public types ──────────────────────────────────────────────────────────────

/// One freshly loaded view of the external data, handed to the UI.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Every known session, most recently updated first.
    pub sessions: Vec<SessionRecord>,
    /// Pre-aggregated blocks for the usage summary.
    pub usage: [NamedUsage; 2],
    /// When the data was read.
    pub loaded_at: DateTime<Utc>,
}

/// Build a snapshot from `data_path` as of `now`.
///
/// No data path means no data source is configured yet, which yields an
/// empty snapshot rather than an error.
pub fn load_snapshot(data_path: Option<&Path>, now: DateTime<Utc>) -> Result<DashboardSnapshot> {
    let sessions = match data_path {
        Some(path) => load_sessions(path)?,
        None => Vec::new(),
    };
    let usage = default_blocks(&sessions, now);
    Ok(DashboardSnapshot {
        sessions,
        usage,
        loaded_at: now,
    })
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background refresh coordinator.
pub struct DashboardOrchestrator {
    update_interval: Duration,
    data_path: Option<PathBuf>,
}

impl DashboardOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Parameters
    /// - `update_interval_secs` – seconds between scheduled reloads.
    /// - `data_path`            – session-record directory, if one is known.
    pub fn new(update_interval_secs: u64, data_path: Option<PathBuf>) -> Self {
        Self {
            update_interval: Duration::from_secs(update_interval_secs.max(1)),
            data_path,
        }
    }

    /// Spawn the refresh loop.
    ///
    /// Returns the snapshot receiver and a [`DashboardHandle`] used to request
    /// extra refreshes or stop the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, DashboardHandle) {
        let (tx, rx) = mpsc::channel(16);
        // One pending request is enough: a second one would load the same data.
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx, refresh_rx).await;
        });

        (
            rx,
            DashboardHandle {
                handle,
                trigger: RefreshTrigger { tx: refresh_tx },
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Load immediately, then on every tick or refresh request until the
    /// snapshot receiver is dropped.
    async fn refresh_loop(
        self,
        tx: mpsc::Sender<DashboardSnapshot>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        self.load_and_send(&tx).await;

        let mut interval = time::interval(self.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the initial load already happened.
        interval.tick().await;

        let mut triggers_open = true;
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                request = refresh_rx.recv(), if triggers_open => {
                    match request {
                        Some(()) => {
                            tracing::debug!("refresh requested");
                            interval.reset();
                        }
                        None => {
                            triggers_open = false;
                            continue;
                        }
                    }
                }
            }

            if tx.is_closed() {
                tracing::debug!("snapshot channel closed; exiting loop");
                break;
            }

            self.load_and_send(&tx).await;
        }
    }

    /// Load on the blocking pool and forward the snapshot.
    ///
    /// Failures are logged and skipped so the UI keeps the last good data.
    async fn load_and_send(&self, tx: &mpsc::Sender<DashboardSnapshot>) {
        let data_path = self.data_path.clone();
        let loaded =
            tokio::task::spawn_blocking(move || load_snapshot(data_path.as_deref(), Utc::now()))
                .await;

        let snapshot = match loaded {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to load sessions; keeping previous data");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session loader task failed");
                return;
            }
        };

        tracing::debug!(sessions = snapshot.sessions.len(), "sending snapshot");
        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send snapshot; receiver dropped");
        }
    }
}

// ── Handles ───────────────────────────────────────────────────────────────────

/// Cloneable sender for on-demand refresh requests.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<()>,
}

impl RefreshTrigger {
    /// Ask for an immediate reload.
    ///
    /// Returns `false` when the loop has stopped. A request made while another
    /// is still pending is folded into it.
    pub fn request_refresh(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

/// A handle to the background refresh task.
pub struct DashboardHandle {
    handle: tokio::task::JoinHandle<()>,
    trigger: RefreshTrigger,
}

impl DashboardHandle {
    /// A trigger the UI can keep to request refreshes.
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    /// Ask for an immediate reload.
    pub fn request_refresh(&self) -> bool {
        self.trigger.request_refresh()
    }

    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dashboard_core::error::DashboardError;
    use tempfile::TempDir;

    fn write_sessions(dir: &Path, lines: &[&str]) {
        std::fs::write(dir.join("sessions.jsonl"), lines.join("\n")).unwrap();
    }

    #[test]
    fn test_orchestrator_creation() {
        let orch = DashboardOrchestrator::new(5, Some(PathBuf::from("/tmp/sessions")));
        assert_eq!(orch.update_interval, Duration::from_secs(5));
        assert_eq!(orch.data_path.as_deref(), Some(Path::new("/tmp/sessions")));
    }

    #[test]
    fn test_orchestrator_zero_interval_clamped() {
        let orch = DashboardOrchestrator::new(0, None);
        assert_eq!(orch.update_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_load_snapshot_without_path_is_empty() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let snapshot = load_snapshot(None, now).unwrap();
        assert!(snapshot.sessions.is_empty());
        assert_eq!(snapshot.loaded_at, now);
        assert_eq!(snapshot.usage[0].name, "Last 7 days");
        assert_eq!(snapshot.usage[1].name, "All time");
    }

    #[test]
    fn test_load_snapshot_reads_sessions() {
        let dir = TempDir::new().unwrap();
        write_sessions(
            dir.path(),
            &[
                r#"{"id":"a","updated_at":1705320000000,"cost":1.0}"#,
                r#"{"id":"b","updated_at":1705310000000,"cost":2.0}"#,
            ],
        );
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let snapshot = load_snapshot(Some(dir.path()), now).unwrap();
        assert_eq!(snapshot.sessions.len(), 2);
        assert_eq!(snapshot.sessions[0].id, "a");
        assert_eq!(
            snapshot.usage[1].stats.get("sessions"),
            Some(&serde_json::json!(2))
        );
    }

    #[test]
    fn test_load_snapshot_missing_path_is_error() {
        let err = load_snapshot(Some(Path::new("/definitely/not/here")), Utc::now()).unwrap_err();
        assert!(matches!(err, DashboardError::DataPathNotFound(_)));
    }

    #[tokio::test]
    async fn test_orchestrator_start_and_abort() {
        let dir = TempDir::new().unwrap();
        let orch = DashboardOrchestrator::new(60, Some(dir.path().to_path_buf()));
        let (_rx, handle) = orch.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    }

    #[tokio::test]
    async fn test_orchestrator_sends_initial_snapshot() {
        let dir = TempDir::new().unwrap();
        write_sessions(dir.path(), &[r#"{"id":"a","updated_at":1}"#]);

        let orch = DashboardOrchestrator::new(60, Some(dir.path().to_path_buf()));
        let (mut rx, handle) = orch.start();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("channel closed before receiving snapshot");
        assert_eq!(snapshot.sessions.len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_refresh_request_sends_extra_snapshot() {
        let dir = TempDir::new().unwrap();
        write_sessions(dir.path(), &[r#"{"id":"a","updated_at":1}"#]);

        let orch = DashboardOrchestrator::new(300, Some(dir.path().to_path_buf()));
        let (mut rx, handle) = orch.start();

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for first snapshot")
            .expect("channel closed");
        assert_eq!(first.sessions.len(), 1);

        write_sessions(
            dir.path(),
            &[r#"{"id":"a","updated_at":1}"#, r#"{"id":"b","updated_at":2}"#],
        );
        assert!(handle.trigger().request_refresh());

        // Far sooner than the 300 s interval.
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("refresh request did not produce a snapshot")
            .expect("channel closed");
        assert_eq!(second.sessions.len(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_missing_data_path_sends_nothing() {
        let orch = DashboardOrchestrator::new(60, Some(PathBuf::from("/definitely/not/here")));
        let (mut rx, handle) = orch.start();

        let received = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(received.is_err(), "no snapshot expected for a failing load");

        handle.abort();
    }

    #[tokio::test]
    async fn test_request_refresh_after_abort_reports_stopped() {
        let orch = DashboardOrchestrator::new(60, None);
        let (rx, handle) = orch.start();
        let trigger = handle.trigger();
        handle.abort();
        drop(rx);

        // Wait for the aborted task to drop its receiver.
        let mut stopped = false;
        for _ in 0..50 {
            if !trigger.request_refresh() {
                stopped = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(stopped);
    }
}

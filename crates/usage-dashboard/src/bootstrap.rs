use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the per-user state directory under `$HOME`.
pub const STATE_DIR: &str = ".usage-dashboard";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.usage-dashboard/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.usage-dashboard/`
/// - `~/.usage-dashboard/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let state_dir = state_dir();
    std::fs::create_dir_all(&state_dir)?;
    std::fs::create_dir_all(state_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI log-level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`) to an
/// [`EnvFilter`] directive. Anything else is passed through unchanged.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// File name used when the live view logs to the state directory.
pub const DEFAULT_LOG_FILE: &str = "usage-dashboard.log";

/// Where log output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this file without ANSI colours.
    File(PathBuf),
    Stderr,
}

/// `~/.usage-dashboard`, or `./.usage-dashboard` when there is no home.
pub fn state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
}

/// Choose the log destination for `view`.
///
/// An explicit `--log-file` always wins. The live view owns the terminal, so
/// it otherwise logs to `<state_dir>/logs/usage-dashboard.log`; every other
/// view logs to stderr, leaving stdout to the report.
pub fn log_target(view: &str, log_file: Option<&Path>, state_dir: &Path) -> LogTarget {
    match log_file {
        Some(path) => LogTarget::File(path.to_path_buf()),
        None if view == "live" => {
            LogTarget::File(state_dir.join("logs").join(DEFAULT_LOG_FILE))
        }
        None => LogTarget::Stderr,
    }
}

/// Open `path` for appending, creating it and its parent directories.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialise the global `tracing` subscriber writing to `target`.
///
/// Unrecognised levels fall back to `"info"`.
pub fn setup_logging(log_level: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match target {
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the session-record directory.
///
/// An explicit path (from `--data-path` or `USAGE_DASHBOARD_DATA`) always
/// wins. Otherwise the following are checked in order and the first that
/// exists is returned:
/// 1. `~/.usage-dashboard/sessions/`
/// 2. `~/.config/usage-dashboard/sessions/`
pub fn discover_data_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let home = dirs::home_dir()?;
    let candidates = [
        home.join(STATE_DIR).join("sessions"),
        home.join(".config").join("usage-dashboard").join("sessions"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Run `f` with `HOME` pointed at `home`, restoring it afterwards.
    ///
    /// Tests touching `HOME` share one lock so they cannot interleave.
    fn with_home<T>(home: &Path, f: impl FnOnce() -> T) -> T {
        static HOME_LOCK: Mutex<()> = Mutex::new(());
        let _guard = HOME_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", home);
        let result = f();
        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }
        result
    }

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        with_home(tmp.path(), ensure_directories).expect("ensure_directories should succeed");

        let state_dir = tmp.path().join(STATE_DIR);
        assert!(state_dir.is_dir(), ".usage-dashboard dir must exist");
        assert!(state_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_normalise_level() {
        assert_eq!(normalise_level("DEBUG"), "debug");
        assert_eq!(normalise_level("info"), "info");
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("ERROR"), "error");
        assert_eq!(normalise_level("Trace"), "trace");
    }

    #[test]
    fn test_log_target_live_defaults_to_state_dir_file() {
        let state = Path::new("/home/u/.usage-dashboard");
        assert_eq!(
            log_target("live", None, state),
            LogTarget::File(state.join("logs").join(DEFAULT_LOG_FILE))
        );
    }

    #[test]
    fn test_log_target_report_uses_stderr() {
        let state = Path::new("/home/u/.usage-dashboard");
        assert_eq!(log_target("report", None, state), LogTarget::Stderr);
    }

    #[test]
    fn test_log_target_explicit_file_wins() {
        let state = Path::new("/home/u/.usage-dashboard");
        let explicit = Path::new("/tmp/dash.log");
        for view in ["live", "report"] {
            assert_eq!(
                log_target(view, Some(explicit), state),
                LogTarget::File(explicit.to_path_buf())
            );
        }
    }

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        use std::io::Write;

        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("logs").join("nested").join(DEFAULT_LOG_FILE);

        writeln!(open_log_file(&path).expect("first open"), "one").unwrap();
        writeln!(open_log_file(&path).expect("second open"), "two").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_setup_logging_file_target_creates_log_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("logs").join(DEFAULT_LOG_FILE);

        // Another test may already have installed the global subscriber;
        // the file is opened before that is attempted.
        let _ = setup_logging("DEBUG", &LogTarget::File(path.clone()));

        assert!(path.is_file(), "log file must be created for a file target");
    }

    #[test]
    fn test_discover_data_path_explicit_wins() {
        let tmp = TempDir::new().expect("tempdir");
        let explicit = tmp.path().join("does-not-exist-yet");
        assert_eq!(discover_data_path(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn test_discover_data_path_returns_none_when_absent() {
        let tmp = TempDir::new().expect("tempdir");
        let path = with_home(tmp.path(), || discover_data_path(None));
        assert!(path.is_none(), "should return None when neither path exists");
    }

    #[test]
    fn test_discover_data_path_finds_state_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let sessions = tmp.path().join(STATE_DIR).join("sessions");
        std::fs::create_dir_all(&sessions).expect("create sessions dir");
        // Also create the fallback; the first candidate must win.
        std::fs::create_dir_all(tmp.path().join(".config/usage-dashboard/sessions"))
            .expect("create fallback dir");

        let path = with_home(tmp.path(), || discover_data_path(None));
        assert_eq!(path, Some(sessions));
    }

    #[test]
    fn test_discover_data_path_finds_config_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let sessions = tmp
            .path()
            .join(".config")
            .join("usage-dashboard")
            .join("sessions");
        std::fs::create_dir_all(&sessions).expect("create sessions dir");

        let path = with_home(tmp.path(), || discover_data_path(None));
        assert_eq!(path, Some(sessions));
    }
}

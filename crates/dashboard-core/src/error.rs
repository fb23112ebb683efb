use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the usage dashboard.
///
/// Display code never returns these: formatting and classification degrade to
/// defaults instead. Errors only surface where the dashboard touches the
/// filesystem or receives a clock reading it cannot represent.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A session file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timestamp was outside the range a UTC date-time can represent.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An explicitly configured data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/some/sessions.jsonl"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/sessions.jsonl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_timestamp() {
        let err = DashboardError::InvalidTimestamp("9223372036854775807".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp: 9223372036854775807");
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = DashboardError::DataPathNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Data path not found: /missing/dir");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}

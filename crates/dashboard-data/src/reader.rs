//! Session-record file discovery and loading.
//!
//! External tools drop session records as `.json` (one object or an array of
//! objects) or `.jsonl` (one object per line) files under the data directory.
//! Loading is forgiving: unreadable files and malformed lines are logged and
//! skipped so one bad file never blanks the dashboard.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::SessionRecord;
use serde_json::Value;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` / `.jsonl` files recursively under `data_path`, sorted.
pub fn find_session_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_session_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read every record from one file.
///
/// A `.jsonl` file yields one record per parseable line. Any other file is
/// parsed as a single JSON document holding either an object or an array of
/// objects; array elements that are not records are skipped.
pub fn read_session_file(path: &Path) -> Result<Vec<SessionRecord>> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    if has_extension(path, "jsonl") {
        return Ok(read_lines(path, reader));
    }

    let document: Value = serde_json::from_reader(reader)?;
    let records = match document {
        Value::Array(items) => items.into_iter().filter_map(record_from_value).collect(),
        other => record_from_value(other).into_iter().collect(),
    };
    Ok(records)
}

/// Load, deduplicate and sort every session record under `data_path`.
///
/// Records sharing a non-empty `id` collapse to the one with the latest
/// `updated_at`. The result is ordered most recently updated first.
pub fn load_sessions(data_path: &Path) -> Result<Vec<SessionRecord>> {
    if !data_path.exists() {
        return Err(DashboardError::DataPathNotFound(data_path.to_path_buf()));
    }

    let files = find_session_files(data_path);
    let mut by_id: HashMap<String, SessionRecord> = HashMap::new();
    let mut anonymous: Vec<SessionRecord> = Vec::new();
    let mut read = 0usize;

    for file_path in &files {
        let records = match read_session_file(file_path) {
            Ok(records) => records,
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                continue;
            }
        };
        read += records.len();

        for record in records {
            if record.id.is_empty() {
                anonymous.push(record);
                continue;
            }
            match by_id.get(&record.id) {
                Some(existing) if existing.updated_at >= record.updated_at => {}
                _ => {
                    by_id.insert(record.id.clone(), record);
                }
            }
        }
    }

    let mut sessions: Vec<SessionRecord> = by_id.into_values().chain(anonymous).collect();
    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));

    debug!(
        "Loaded {} sessions ({} records) from {} files",
        sessions.len(),
        read,
        files.len()
    );

    Ok(sessions)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}

fn is_session_file(path: &Path) -> bool {
    has_extension(path, "json") || has_extension(path, "jsonl")
}

/// Parse one JSON value into a record; only objects qualify.
fn record_from_value(value: Value) -> Option<SessionRecord> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn read_lines(path: &Path, reader: impl BufRead) -> Vec<SessionRecord> {
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for line in reader.lines() {
        let Ok(line) = line else {
            skipped += 1;
            continue;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed)
            .ok()
            .and_then(record_from_value)
        {
            Some(record) => records.push(record),
            None => {
                debug!("Unparseable line in {}", path.display());
                skipped += 1;
            }
        }
    }

    debug!(
        "File {}: {} records, {} skipped",
        path.display(),
        records.len(),
        skipped
    );
    records
}

// ── Tests ──────────────────────────────────────────────────────────────────────

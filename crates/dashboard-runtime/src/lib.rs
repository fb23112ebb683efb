//! Runtime orchestration layer for the usage dashboard.
//!
//! Runs the background refresh loop that feeds freshly loaded snapshots to
//! the UI layer and accepts on-demand refresh requests from it.

pub mod orchestrator;

pub use dashboard_core as core;
pub use dashboard_data as data;

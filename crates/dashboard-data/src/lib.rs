//! Data source layer for the usage dashboard.
//!
//! Discovers and reads session-record files written by external tools and
//! pre-aggregates the usage blocks shown by the summary view.

pub mod reader;
pub mod summary;

pub use dashboard_core as core;

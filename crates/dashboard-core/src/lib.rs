//! Domain core of the usage dashboard.
//!
//! Holds the session record model, the daily cost aggregation, display
//! formatting and band classification, the tab-selector and usage-summary
//! render contracts, error types and CLI settings. Everything except
//! [`settings`] is free of I/O.

pub mod daily;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod tabs;
pub mod time_utils;
pub mod usage;

//! Terminal UI layer for the usage dashboard.
//!
//! Provides themes mapping display bands to styles, the header, tab bar,
//! cost banner, usage summary and session list components, and the main
//! application event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod themes;

pub use dashboard_core as core;

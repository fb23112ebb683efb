//! Reusable widgets composed by [`crate::app::App`].

pub mod cost_banner;
pub mod header;
pub mod sessions_list;
pub mod tab_bar;
pub mod usage_summary;

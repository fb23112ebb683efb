//! Usage summary display contract.
//!
//! The two usage blocks arrive pre-aggregated as loose key/value maps; this
//! module only picks fields out of them and substitutes defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formatting::{format_cost, format_tokens_value};
use crate::models::{value_as_f64, DashboardEvent};

/// One pre-aggregated usage block: an arbitrary string-keyed map.
///
/// Conventional keys are `sessions`, `cost`, `tokens_in` and `tokens_out`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageStats(pub BTreeMap<String, Value>);

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }
}

/// A usage block together with the name of the source it summarises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUsage {
    pub name: String,
    pub stats: UsageStats,
}

impl NamedUsage {
    pub fn new(name: impl Into<String>, stats: UsageStats) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }
}

/// Render description of one usage block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageBlockView {
    pub title: String,
    /// Session count; `"0"` when missing.
    pub sessions: String,
    /// Cost label; `"$0"` when missing.
    pub cost: String,
    /// Magnitude-scaled input tokens, when the block carries them.
    pub tokens_in: Option<String>,
    /// Magnitude-scaled output tokens, when the block carries them.
    pub tokens_out: Option<String>,
}

/// Stateless usage-summary logic.
pub struct UsageSummaryView;

impl UsageSummaryView {
    /// Build the render description for both blocks.
    pub fn render(primary: &NamedUsage, secondary: &NamedUsage) -> [UsageBlockView; 2] {
        [Self::block(primary), Self::block(secondary)]
    }

    /// Build the render description for one block.
    pub fn block(usage: &NamedUsage) -> UsageBlockView {
        let stats = &usage.stats;
        UsageBlockView {
            title: usage.name.clone(),
            sessions: stats.get("sessions").map(display_count).unwrap_or_else(|| "0".to_string()),
            cost: stats.get("cost").map(display_cost).unwrap_or_else(|| "$0".to_string()),
            tokens_in: stats.get("tokens_in").map(format_tokens_value),
            tokens_out: stats.get("tokens_out").map(format_tokens_value),
        }
    }

    /// The notification to send upward when the user asks for fresh data.
    pub fn request_refresh() -> DashboardEvent {
        DashboardEvent::RefreshRequested
    }
}

/// Integers print as-is, strings verbatim, anything else as `"0"`.
fn display_count(value: &Value) -> String {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.to_string())
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| format!("{}", v.round())))
            .unwrap_or_else(|| "0".to_string()),
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => "0".to_string(),
    }
}

/// Pre-formatted strings pass through; numbers go through [`format_cost`].
fn display_cost(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        other => value_as_f64(other)
            .map(format_cost)
            .unwrap_or_else(|| "$0".to_string()),
    }
}

//! Session records, the daily aggregate and component events.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::time_utils;

/// One unit of agent/tool usage as written by an external tool.
///
/// Only `updated_at`, `cost`, `tokens_in` and `tokens_out` take part in the
/// daily aggregation. Every numeric field is read leniently: missing, `null`,
/// negative or non-numeric values become `0` so a malformed record can never
/// make an aggregate fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identifier used to collapse duplicate records; may be empty.
    #[serde(default)]
    pub id: String,
    /// Optional human-readable session name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form status string (`"running"`, `"idle"`, `"error"`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Last-activity timestamp in milliseconds since the Unix epoch (UTC).
    ///
    /// Also accepts an RFC 3339 string on input.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub updated_at: i64,
    /// Cost in US dollars.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: f64,
    /// Input (prompt) tokens.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tokens_in: u64,
    /// Output (completion) tokens.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tokens_out: u64,
}

impl SessionRecord {
    /// A record with the given timestamp and every counter at zero.
    pub fn new(id: impl Into<String>, updated_at: i64) -> Self {
        Self {
            id: id.into(),
            updated_at,
            ..Self::default()
        }
    }

    /// Set the cost, clamping anything negative or non-finite to zero.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = sanitize_cost(cost);
        self
    }

    /// Set both token counters.
    pub fn with_tokens(mut self, tokens_in: u64, tokens_out: u64) -> Self {
        self.tokens_in = tokens_in;
        self.tokens_out = tokens_out;
        self
    }

    /// Set the status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Display name: `name` when present, otherwise `id`, otherwise `"untitled"`.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.id.is_empty() => &self.id,
            _ => "untitled",
        }
    }
}

/// Today's summed usage, recomputed from the session list on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyAggregate {
    /// Sum of `cost` over today's sessions.
    pub total_cost: f64,
    /// Number of sessions updated today.
    pub session_count: usize,
    /// Sum of `tokens_in` over today's sessions.
    pub tokens_in_total: u64,
    /// Sum of `tokens_out` over today's sessions.
    pub tokens_out_total: u64,
}

/// Upward notifications emitted by the dashboard components.
///
/// Components never apply these themselves; the parent view owns the state
/// they refer to and re-supplies it on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// The user picked the tab with this id.
    SelectTab(String),
    /// The user asked for the usage data to be reloaded.
    RefreshRequested,
}

// ── Lenient field readers ─────────────────────────────────────────────────────

/// Interpret a JSON value as a number, accepting numeric strings.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost > 0.0 {
        cost
    } else {
        0.0
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .map(sanitize_cost)
        .unwrap_or(0.0))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.unwrap_or(0))
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let millis = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| time_utils::parse_timestamp(&s).map(|dt| dt.timestamp_millis())),
        _ => None,
    };
    Ok(millis.unwrap_or(0))
}

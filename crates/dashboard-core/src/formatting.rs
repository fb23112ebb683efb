//! Display formatting and threshold classification for usage figures.
//!
//! Every function here is total: out-of-range, negative or non-numeric input
//! degrades to a zero-like rendering instead of failing.

use serde::Serialize;
use serde_json::Value;

use crate::models::{value_as_f64, DailyAggregate};

// ── Cost ──────────────────────────────────────────────────────────────────────

/// Display band for a cost figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBand {
    /// Below $5.
    Nominal,
    /// From $5 up to (not including) $10.
    Warning,
    /// $10 and above.
    Alert,
}

/// Format a dollar amount for the cost banner.
///
/// * `cost >= 0.01` → two decimals (`"$1.24"`, `"$12.00"`)
/// * `0 < cost < 0.01` → four decimals (`"$0.0050"`)
/// * `cost <= 0` or not a number → `"$0.00"`
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_cost;
///
/// assert_eq!(format_cost(1.236), "$1.24");
/// assert_eq!(format_cost(0.005), "$0.0050");
/// assert_eq!(format_cost(0.0),   "$0.00");
/// ```
pub fn format_cost(cost: f64) -> String {
    if cost.is_nan() || cost <= 0.0 {
        "$0.00".to_string()
    } else if cost >= 0.01 {
        format!("${:.2}", round_to(cost, 2))
    } else {
        format!("${:.4}", round_to(cost, 4))
    }
}

/// Classify a cost into its display band.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::{cost_color, CostBand};
///
/// assert_eq!(cost_color(4.99),  CostBand::Nominal);
/// assert_eq!(cost_color(5.0),   CostBand::Warning);
/// assert_eq!(cost_color(10.0),  CostBand::Alert);
/// ```
pub fn cost_color(cost: f64) -> CostBand {
    if cost >= 10.0 {
        CostBand::Alert
    } else if cost >= 5.0 {
        CostBand::Warning
    } else {
        CostBand::Nominal
    }
}

// ── Tokens ────────────────────────────────────────────────────────────────────

/// Format a token count with a magnitude suffix.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_tokens;
///
/// assert_eq!(format_tokens(999),       "999");
/// assert_eq!(format_tokens(1_000),     "1.0K");
/// assert_eq!(format_tokens(1_500_000), "1.5M");
/// ```
pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", round_to(n as f64 / 1_000_000.0, 1))
    } else if n >= 1_000 {
        format!("{:.1}K", round_to(n as f64 / 1_000.0, 1))
    } else {
        n.to_string()
    }
}

/// [`format_tokens`] for an untyped value from a pre-aggregated usage block.
///
/// Anything that is not a non-negative number renders as `"0"`.
pub fn format_tokens_value(value: &Value) -> String {
    match value_as_f64(value) {
        Some(v) if v >= 0.0 => format_tokens(v.round() as u64),
        _ => "0".to_string(),
    }
}

// ── Counts ────────────────────────────────────────────────────────────────────

/// Naive English pluralization: `"1 session"`, `"0 sessions"`, `"5 sessions"`.
pub fn pluralize(n: u64, word: &str) -> String {
    if n == 1 {
        format!("1 {}", word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let rounded = round_to(value.abs(), decimals);

    let integer_part = rounded.trunc() as u64;
    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!(
            "{:.prec$}",
            rounded - rounded.trunc(),
            prec = decimals as usize
        );
        // `frac_str` is "0.xx"; keep the ".xx".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an age in minutes: `"45m"`, `"3h"`, `"3h 45m"`, `"2d 4h"`.
pub fn format_age(minutes: f64) -> String {
    let total_mins = if minutes.is_finite() {
        minutes.max(0.0).round() as i64
    } else {
        0
    };
    if total_mins < 60 {
        return format!("{}m", total_mins);
    }
    let total_hours = total_mins / 60;
    if total_hours >= 24 {
        let days = total_hours / 24;
        let hours = total_hours % 24;
        return if hours == 0 {
            format!("{}d", days)
        } else {
            format!("{}d {}h", days, hours)
        };
    }
    let mins = total_mins % 60;
    if mins == 0 {
        format!("{}h", total_hours)
    } else {
        format!("{}h {}m", total_hours, mins)
    }
}

// ── Daily banner bundle ───────────────────────────────────────────────────────

/// Every display attribute the cost banner derives from a [`DailyAggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCostDisplay {
    /// Formatted total cost, e.g. `"$2.50"`.
    pub cost: String,
    /// Colour band of the total cost.
    pub band: CostBand,
    /// Magnitude-scaled input tokens, e.g. `"12.3K"`.
    pub tokens_in: String,
    /// Magnitude-scaled output tokens.
    pub tokens_out: String,
    /// Pluralized session count, e.g. `"3 sessions"`.
    pub sessions: String,
}

impl DailyCostDisplay {
    /// Derive the banner attributes from an aggregate.
    pub fn from_aggregate(aggregate: &DailyAggregate) -> Self {
        Self {
            cost: format_cost(aggregate.total_cost),
            band: cost_color(aggregate.total_cost),
            tokens_in: format_tokens(aggregate.tokens_in_total),
            tokens_out: format_tokens(aggregate.tokens_out_total),
            sessions: pluralize(aggregate.session_count as u64, "session"),
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Round half away from zero at `decimals` places.
///
/// A tiny epsilon proportional to the magnitude is added first so values whose
/// binary representation sits just below a decimal midpoint still round up.
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * value.abs() * factor;
    ((value * factor) + epsilon.copysign(value)).round() / factor
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── format_cost ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_cost_zero_and_negative() {
        assert_eq!(format_cost(0.0), "$0.00");
        assert_eq!(format_cost(-4.2), "$0.00");
        assert_eq!(format_cost(f64::NAN), "$0.00");
    }

    #[test]
    fn test_format_cost_sub_cent_uses_four_decimals() {
        assert_eq!(format_cost(0.005), "$0.0050");
        assert_eq!(format_cost(0.0001), "$0.0001");
        assert_eq!(format_cost(0.00999), "$0.0100");
    }

    #[test]
    fn test_format_cost_rounds_to_cents() {
        assert_eq!(format_cost(1.236), "$1.24");
        assert_eq!(format_cost(12.0), "$12.00");
        assert_eq!(format_cost(0.5), "$0.50");
    }

    #[test]
    fn test_format_cost_boundaries() {
        assert_eq!(format_cost(1.0), "$1.00");
        assert_eq!(format_cost(0.01), "$0.01");
        assert_eq!(format_cost(0.999), "$1.00");
    }

    #[test]
    fn test_format_cost_large_has_no_grouping() {
        assert_eq!(format_cost(1234.5), "$1234.50");
    }

    // ── cost_color ───────────────────────────────────────────────────────────

    #[test]
    fn test_cost_color_thresholds() {
        assert_eq!(cost_color(0.0), CostBand::Nominal);
        assert_eq!(cost_color(4.99), CostBand::Nominal);
        assert_eq!(cost_color(5.0), CostBand::Warning);
        assert_eq!(cost_color(9.99), CostBand::Warning);
        assert_eq!(cost_color(10.0), CostBand::Alert);
        assert_eq!(cost_color(250.0), CostBand::Alert);
    }

    #[test]
    fn test_cost_color_nan_is_nominal() {
        assert_eq!(cost_color(f64::NAN), CostBand::Nominal);
    }

    // ── format_tokens ────────────────────────────────────────────────────────

    #[test]
    fn test_format_tokens_plain() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(999), "999");
    }

    #[test]
    fn test_format_tokens_thousands() {
        assert_eq!(format_tokens(1_000), "1.0K");
        assert_eq!(format_tokens(12_345), "12.3K");
        assert_eq!(format_tokens(1_550), "1.6K");
    }

    #[test]
    fn test_format_tokens_millions() {
        assert_eq!(format_tokens(1_000_000), "1.0M");
        assert_eq!(format_tokens(1_500_000), "1.5M");
    }

    #[test]
    fn test_format_tokens_value_non_numeric() {
        assert_eq!(format_tokens_value(&json!("lots")), "0");
        assert_eq!(format_tokens_value(&Value::Null), "0");
        assert_eq!(format_tokens_value(&json!([1])), "0");
        assert_eq!(format_tokens_value(&json!(-10)), "0");
    }

    #[test]
    fn test_format_tokens_value_numeric() {
        assert_eq!(format_tokens_value(&json!(2_500)), "2.5K");
        assert_eq!(format_tokens_value(&json!(42.0)), "42");
        assert_eq!(format_tokens_value(&json!("3000000")), "3.0M");
    }

    // ── pluralize ────────────────────────────────────────────────────────────

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "session"), "1 session");
        assert_eq!(pluralize(0, "session"), "0 sessions");
        assert_eq!(pluralize(5, "session"), "5 sessions");
    }

    #[test]
    fn test_pluralize_is_naive() {
        assert_eq!(pluralize(2, "child"), "2 childs");
    }

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_decimals() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(123.456, 2), "123.46");
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    // ── format_age ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0.0), "0m");
        assert_eq!(format_age(45.0), "45m");
        assert_eq!(format_age(60.0), "1h");
        assert_eq!(format_age(225.0), "3h 45m");
        assert_eq!(format_age(60.0 * 24.0), "1d");
        assert_eq!(format_age(60.0 * 28.0), "1d 4h");
    }

    #[test]
    fn test_format_age_negative_and_nan() {
        // Clock-skewed records can have a negative age.
        assert_eq!(format_age(-12.0), "0m");
        assert_eq!(format_age(f64::NAN), "0m");
    }

    // ── DailyCostDisplay ─────────────────────────────────────────────────────

    #[test]
    fn test_daily_cost_display_from_aggregate() {
        let agg = DailyAggregate {
            total_cost: 7.5,
            session_count: 1,
            tokens_in_total: 12_000,
            tokens_out_total: 800,
        };
        let display = DailyCostDisplay::from_aggregate(&agg);
        assert_eq!(display.cost, "$7.50");
        assert_eq!(display.band, CostBand::Warning);
        assert_eq!(display.tokens_in, "12.0K");
        assert_eq!(display.tokens_out, "800");
        assert_eq!(display.sessions, "1 session");
    }

    #[test]
    fn test_daily_cost_display_empty_day() {
        let display = DailyCostDisplay::from_aggregate(&DailyAggregate::default());
        assert_eq!(display.cost, "$0.00");
        assert_eq!(display.band, CostBand::Nominal);
        assert_eq!(display.sessions, "0 sessions");
    }
}

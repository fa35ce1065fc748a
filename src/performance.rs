//! Complexity and execution-time estimate for a workflow graph.

use crate::graph::{Node, WorkflowGraph, config_lookup};
use crate::vocabulary::{ActionKind, Vocabulary};
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

/// Config keys that may hold a delay duration, in lookup order.
pub const DELAY_KEYS: &[&str] = &["delay", "duration", "wait", "waitTime", "delaySeconds"];

/// Nodes slower than this are always reported as bottlenecks.
const BOTTLENECK_SECONDS: f64 = 60.0;
const MAX_BOTTLENECKS: usize = 5;

const EXTERNAL_CALL_SECONDS: f64 = 2.0;
const BULK_SEND_SECONDS: f64 = 5.0;
const MESSAGE_SECONDS: f64 = 0.5;
const DEFAULT_STEP_SECONDS: f64 = 0.1;

/// Longest delay a single step is credited with (100 years). Keeps the summed
/// estimate finite no matter what a config claims.
pub const MAX_DELAY_SECONDS: f64 = 100.0 * 365.0 * 86_400.0;

static DELAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([smhd])$").expect("delay pattern is valid"));

/// Coarse structural complexity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
            Complexity::VeryHigh => "Very High",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEstimate {
    pub estimated_steps: usize,
    pub estimated_time_seconds: f64,
    pub complexity: Complexity,
    /// At most five entries, slowest first.
    pub bottlenecks: Vec<String>,
}

/// Parses a delay given either as raw seconds or as `<integer><unit>` with
/// unit `s`, `m`, `h` or `d`. Anything else is zero. Results are capped at
/// [`MAX_DELAY_SECONDS`].
pub fn parse_delay(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs.min(MAX_DELAY_SECONDS))
            .unwrap_or(0.0),
        Value::String(raw) => parse_delay_str(raw),
        _ => 0.0,
    }
}

pub fn parse_delay_str(raw: &str) -> f64 {
    let Some(caps) = DELAY_PATTERN.captures(raw.trim()) else {
        return 0.0;
    };
    let Ok(amount) = caps[1].parse::<u64>() else {
        return 0.0;
    };
    let unit = match &caps[2] {
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3_600.0,
        "d" => 86_400.0,
        _ => return 0.0,
    };
    (amount as f64 * unit).min(MAX_DELAY_SECONDS)
}

/// The delay configured on a wait step, zero when none is set.
pub fn configured_delay(config: &Map<String, Value>) -> f64 {
    DELAY_KEYS
        .iter()
        .find_map(|key| config_lookup(config, key))
        .map(parse_delay)
        .unwrap_or(0.0)
}

/// Expected wall-clock cost of a single node, in seconds.
pub fn node_time_cost(node: &Node, vocabulary: &Vocabulary) -> f64 {
    match vocabulary.kind_of(&node.type_tag) {
        ActionKind::Delay => configured_delay(&node.config),
        ActionKind::Webhook | ActionKind::HttpRequest | ActionKind::Api => EXTERNAL_CALL_SECONDS,
        ActionKind::BulkEmail | ActionKind::BulkSms => BULK_SEND_SECONDS,
        ActionKind::Email | ActionKind::Sms => MESSAGE_SECONDS,
        _ => DEFAULT_STEP_SECONDS,
    }
}

/// Buckets are checked in order; the first match wins.
pub fn complexity_bucket(nodes: usize, branches: i64) -> Complexity {
    if nodes < 10 && branches < 3 {
        Complexity::Low
    } else if nodes < 25 && branches < 8 {
        Complexity::Medium
    } else if nodes < 50 && branches < 15 {
        Complexity::High
    } else {
        Complexity::VeryHigh
    }
}

pub fn estimate_performance(graph: &WorkflowGraph) -> PerformanceEstimate {
    estimate_performance_with(graph, &Vocabulary::default())
}

pub fn estimate_performance_with(
    graph: &WorkflowGraph,
    vocabulary: &Vocabulary,
) -> PerformanceEstimate {
    let costs: Vec<(&Node, f64)> = graph
        .nodes()
        .iter()
        .map(|node| (node, node_time_cost(node, vocabulary)))
        .collect();

    let estimated_time_seconds = costs
        .iter()
        .map(|(_, cost)| cost)
        .sum::<f64>()
        .min(f64::MAX);

    // `sorted_by` is stable, so equal costs keep graph order.
    let bottlenecks = costs
        .iter()
        .filter(|(node, cost)| {
            let kind = vocabulary.kind_of(&node.type_tag);
            *cost > BOTTLENECK_SECONDS || kind.is_external_call() || kind.is_bulk()
        })
        .sorted_by(|(_, a), (_, b)| b.total_cmp(a))
        .take(MAX_BOTTLENECKS)
        .map(|(node, cost)| format!("{} ({}): ~{}", node.label, node.type_tag, format_seconds(*cost)))
        .collect();

    PerformanceEstimate {
        estimated_steps: graph.node_count(),
        estimated_time_seconds,
        complexity: complexity_bucket(graph.node_count(), graph.branch_approximation()),
        bottlenecks,
    }
}

/// Renders a duration with the largest whole unit that fits.
pub fn format_seconds(secs: f64) -> String {
    if secs >= 86_400.0 {
        format!("{:.1}d", secs / 86_400.0)
    } else if secs >= 3_600.0 {
        format!("{:.1}h", secs / 3_600.0)
    } else if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_delay_units() {
        assert_eq!(parse_delay(&json!("2h")), 7200.0);
        assert_eq!(parse_delay(&json!("30m")), 1800.0);
        assert_eq!(parse_delay(&json!("1d")), 86400.0);
        assert_eq!(parse_delay(&json!("45s")), 45.0);
    }

    #[test]
    fn test_parse_delay_rejects_garbage() {
        assert_eq!(parse_delay(&json!("garbage")), 0.0);
        assert_eq!(parse_delay(&json!("")), 0.0);
        assert_eq!(parse_delay(&json!("2w")), 0.0);
        assert_eq!(parse_delay(&json!("h2")), 0.0);
        assert_eq!(parse_delay(&json!(null)), 0.0);
        assert_eq!(parse_delay(&json!(-5)), 0.0);
    }

    #[test]
    fn test_parse_delay_numeric_is_seconds() {
        assert_eq!(parse_delay(&json!(42)), 42.0);
        assert_eq!(parse_delay(&json!(1.5)), 1.5);
    }

    #[test]
    fn test_complexity_bucket_order() {
        assert_eq!(complexity_bucket(0, 2), Complexity::Low);
        assert_eq!(complexity_bucket(9, 3), Complexity::Medium);
        assert_eq!(complexity_bucket(10, 0), Complexity::Medium);
        assert_eq!(complexity_bucket(24, 7), Complexity::Medium);
        assert_eq!(complexity_bucket(25, 1), Complexity::High);
        assert_eq!(complexity_bucket(49, 14), Complexity::High);
        assert_eq!(complexity_bucket(49, 15), Complexity::VeryHigh);
        assert_eq!(complexity_bucket(50, 0), Complexity::VeryHigh);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2.0), "2.0s");
        assert_eq!(format_seconds(7200.0), "2.0h");
        assert_eq!(format_seconds(172_800.0), "2.0d");
    }
}

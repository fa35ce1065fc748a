//! Deterministic health score, letter grade and confidence rating.

use crate::graph::{NodeKind, WorkflowGraph};
use crate::issue::Issue;
use crate::vocabulary::Vocabulary;
use crate::workflow::WorkflowMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tunable weights for the multiplier and the structural surcharges.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringWeights {
    /// Contact count at which a workflow counts as high-volume.
    pub high_volume_contacts: u64,
    pub high_volume_factor: f64,
    pub active_factor: f64,
    pub action_count_threshold: usize,
    pub action_count_surcharge: f64,
    pub branch_count_threshold: usize,
    pub branch_count_surcharge: f64,
    pub external_dependency_threshold: usize,
    pub external_dependency_surcharge: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            high_volume_contacts: 1_000,
            high_volume_factor: 1.5,
            active_factor: 1.3,
            action_count_threshold: 50,
            action_count_surcharge: 10.0,
            branch_count_threshold: 10,
            branch_count_surcharge: 5.0,
            external_dependency_threshold: 5,
            external_dependency_surcharge: 10.0,
        }
    }
}

impl ScoringWeights {
    /// Factors must be finite and at least 1.0, surcharges finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        for (name, factor) in [
            ("highVolumeFactor", self.high_volume_factor),
            ("activeFactor", self.active_factor),
        ] {
            if !factor.is_finite() || factor < 1.0 {
                return Err(format!("{} must be a number >= 1.0, got {}", name, factor));
            }
        }
        for (name, surcharge) in [
            ("actionCountSurcharge", self.action_count_surcharge),
            ("branchCountSurcharge", self.branch_count_surcharge),
            ("externalDependencySurcharge", self.external_dependency_surcharge),
        ] {
            if !surcharge.is_finite() || surcharge < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, surcharge));
            }
        }
        Ok(())
    }
}

/// Counters attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub is_active: bool,
    pub contact_count: u64,
    pub severity_multiplier: f64,
    /// Nodes with a non-empty id and a recognizable type tag.
    pub analyzed_node_count: usize,
    pub total_node_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    #[serde(rename = "High Risk")]
    HighRisk,
    Critical,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::NeedsAttention => "Needs Attention",
            Grade::HighRisk => "High Risk",
            Grade::Critical => "Critical",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        };
        write!(f, "{}", name)
    }
}

/// Composes the volume and activity factors multiplicatively.
pub fn severity_multiplier(workflow: &WorkflowMetadata, weights: &ScoringWeights) -> f64 {
    let volume = if workflow.contact_count >= weights.high_volume_contacts {
        weights.high_volume_factor
    } else {
        1.0
    };
    let activity = if workflow.is_active() {
        weights.active_factor
    } else {
        1.0
    };
    volume * activity
}

/// `100 - Σ(penalty × multiplier) - surcharges`, clamped to `[0, 100]` once at the end.
pub fn health_score(
    issues: &[Issue],
    workflow: &WorkflowMetadata,
    multiplier: f64,
    weights: &ScoringWeights,
) -> u8 {
    let mut penalties: f64 = issues.iter().map(|issue| issue.penalty * multiplier).sum();

    if workflow.actions.len() > weights.action_count_threshold {
        penalties += weights.action_count_surcharge * multiplier;
    }
    if workflow.branch_count > weights.branch_count_threshold {
        penalties += weights.branch_count_surcharge * multiplier;
    }
    if workflow.external_dependency_count > weights.external_dependency_threshold {
        penalties += weights.external_dependency_surcharge * multiplier;
    }

    let score = 100.0 - penalties;
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

/// Fixed thresholds, each inclusive on its lower bound.
pub fn grade(score: u8) -> Grade {
    match score {
        90.. => Grade::Excellent,
        70..=89 => Grade::Good,
        50..=69 => Grade::NeedsAttention,
        30..=49 => Grade::HighRisk,
        _ => Grade::Critical,
    }
}

/// Rates how much of the graph the analysis could actually understand.
///
/// Small graphs (fewer than five nodes) never drop below `Medium`; an empty
/// graph has no defined coverage ratio and lands there too.
pub fn confidence(metadata: &AnalysisMetadata) -> Confidence {
    let total = metadata.total_node_count;
    let coverage = if total == 0 {
        None
    } else {
        Some(metadata.analyzed_node_count as f64 / total as f64)
    };
    let covers = |threshold: f64| coverage.is_some_and(|ratio| ratio >= threshold);

    if covers(0.8) && total >= 5 {
        Confidence::High
    } else if covers(0.5) || total < 5 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Counts nodes that have a non-empty id and a type tag the analyzer understands.
///
/// Triggers only need a non-empty tag, since every trigger type is analyzable
/// for conflicts; actions and conditions need a tag from the vocabulary.
pub fn analyzed_node_count(graph: &WorkflowGraph, vocabulary: &Vocabulary) -> usize {
    graph
        .nodes()
        .iter()
        .filter(|node| !node.id.trim().is_empty() && !node.type_tag.trim().is_empty())
        .filter(|node| match node.kind {
            NodeKind::Trigger => true,
            NodeKind::Action | NodeKind::Condition => vocabulary.is_recognized(&node.type_tag),
            NodeKind::Unknown => false,
        })
        .count()
}

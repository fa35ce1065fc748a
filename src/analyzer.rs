use crate::config::AnalyzerConfig;
use crate::detectors::{DetectionInput, IssueDetector, dedup_issues, default_detectors, run_detector};
use crate::graph::{DEFAULT_CYCLE_LIMIT, WorkflowGraph};
use crate::issue::{Issue, PenaltyTable};
use crate::performance::{PerformanceEstimate, estimate_performance_with};
use crate::recommend::synthesize_recommendations;
use crate::scoring::{
    AnalysisMetadata, Confidence, Grade, ScoringWeights, analyzed_node_count, confidence, grade,
    health_score, severity_multiplier,
};
use crate::vocabulary::Vocabulary;
use crate::workflow::{NormalizedWorkflow, WorkflowMetadata};
use serde::{Deserialize, Serialize};

/// The complete outcome of analyzing one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub workflow_id: String,
    pub workflow_name: String,
    pub health_score: u8,
    pub grade: Grade,
    pub confidence: Confidence,
    pub issues: Vec<Issue>,
    pub performance: PerformanceEstimate,
    pub metadata: AnalysisMetadata,
    pub recommendations: Vec<String>,
}

/// Runs the detector registry over a workflow and scores the findings.
///
/// An `Analyzer` holds no per-run state and can be shared between threads;
/// `analyze` is a pure function of its inputs.
pub struct Analyzer {
    detectors: Vec<Box<dyn IssueDetector>>,
    vocabulary: Vocabulary,
    penalties: PenaltyTable,
    weights: ScoringWeights,
    cycle_limit: usize,
}

pub struct AnalyzerBuilder {
    detectors: Vec<Box<dyn IssueDetector>>,
    vocabulary: Vocabulary,
    penalties: PenaltyTable,
    weights: ScoringWeights,
    cycle_limit: usize,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            detectors: default_detectors(),
            vocabulary: Vocabulary::new(),
            penalties: PenaltyTable::default(),
            weights: ScoringWeights::default(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyTable) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Maps a vendor step type onto one of the builtin tags, e.g.
    /// `with_type_alias("fireWebhook", "webhook")`.
    pub fn with_type_alias(mut self, vendor_tag: &str, internal_tag: &str) -> Self {
        self.vocabulary.insert_alias(vendor_tag, internal_tag);
        self
    }

    /// Appends a detector after the builtin ones.
    pub fn with_detector(mut self, detector: Box<dyn IssueDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Caps how many distinct cycles are enumerated; values below 1 are raised to 1.
    pub fn with_cycle_limit(mut self, cycle_limit: usize) -> Self {
        self.cycle_limit = cycle_limit.max(1);
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        for (vendor_tag, internal_tag) in &config.type_aliases {
            self.vocabulary.insert_alias(vendor_tag, internal_tag);
        }
        self.penalties = config.penalties;
        self.weights = config.weights;
        self.with_cycle_limit(config.cycle_limit)
    }

    pub fn build(self) -> Analyzer {
        Analyzer {
            detectors: self.detectors,
            vocabulary: self.vocabulary,
            penalties: self.penalties,
            weights: self.weights,
            cycle_limit: self.cycle_limit,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        AnalyzerBuilder::new().build()
    }
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Ids of the registered detectors, in run order.
    pub fn detector_ids(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn analyze_normalized(&self, workflow: &NormalizedWorkflow) -> AnalysisResult {
        self.analyze(&workflow.graph, &workflow.metadata)
    }

    /// Analyzes one workflow. Never fails: malformed or missing configuration
    /// shows up as issues, not errors.
    pub fn analyze(&self, graph: &WorkflowGraph, workflow: &WorkflowMetadata) -> AnalysisResult {
        tracing::debug!(
            workflow = %workflow.id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            actions = workflow.actions.len(),
            "analyzing workflow"
        );

        let input = DetectionInput {
            graph,
            workflow,
            vocabulary: &self.vocabulary,
            penalties: &self.penalties,
            cycle_limit: self.cycle_limit,
        };
        let issues = dedup_issues(
            self.detectors
                .iter()
                .flat_map(|detector| run_detector(detector.as_ref(), &input))
                .collect(),
        );

        let performance = estimate_performance_with(graph, &self.vocabulary);
        let multiplier = severity_multiplier(workflow, &self.weights);
        let health_score = health_score(&issues, workflow, multiplier, &self.weights);

        let metadata = AnalysisMetadata {
            is_active: workflow.is_active(),
            contact_count: workflow.contact_count,
            severity_multiplier: multiplier,
            analyzed_node_count: analyzed_node_count(graph, &self.vocabulary),
            total_node_count: graph.node_count(),
        };
        let confidence = confidence(&metadata);
        let recommendations =
            synthesize_recommendations(&issues, workflow, self.weights.high_volume_contacts);

        tracing::debug!(
            workflow = %workflow.id,
            issues = issues.len(),
            score = health_score,
            "analysis finished"
        );

        AnalysisResult {
            workflow_id: workflow.id.clone(),
            workflow_name: workflow.name.clone(),
            health_score,
            grade: grade(health_score),
            confidence,
            issues,
            performance,
            metadata,
            recommendations,
        }
    }
}

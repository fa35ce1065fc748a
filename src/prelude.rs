//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowaudit crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowaudit::prelude::*;
//!
//! # fn run_example(workflow: NormalizedWorkflow) -> Result<()> {
//! let config = AnalyzerConfig::from_file("path/to/analyzer.json")?;
//! let analyzer = Analyzer::builder().with_config(config).build();
//!
//! let result = analyzer.analyze(&workflow.graph, &workflow.metadata);
//! println!("{}", ReportFormatter::format(&result));
//! # Ok(())
//! # }
//! ```

// Analysis entry points
pub use crate::analyzer::{AnalysisResult, Analyzer, AnalyzerBuilder};
pub use crate::config::AnalyzerConfig;

// Graph model
pub use crate::graph::{Edge, Loop, Node, NodeKind, TriggerConflict, WorkflowGraph};

// Raw metadata and the conversion boundary
pub use crate::workflow::{
    ActionRecord, IntoWorkflow, NormalizedWorkflow, WebhookRecord, WorkflowMetadata,
    WorkflowStatus,
};

// Findings and scoring
pub use crate::detectors::{DetectionInput, IssueDetector};
pub use crate::issue::{Issue, IssueCategory, PenaltyTable, Severity};
pub use crate::performance::{Complexity, PerformanceEstimate};
pub use crate::scoring::{AnalysisMetadata, Confidence, Grade, ScoringWeights};

// Error types
pub use crate::error::{ConfigError, GraphError, WorkflowConversionError};

// Report formatting
pub use crate::report::ReportFormatter;

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

//! # FlowAudit - Workflow Graph Analysis and Health Scoring
//!
//! **FlowAudit** audits CRM automation workflows before they hurt real contacts.
//! It takes a workflow as a directed graph of triggers, actions and conditions,
//! runs a fixed set of issue detectors over it, estimates its runtime cost and
//! condenses everything into a deterministic health score, a letter grade and a
//! short list of recommendations.
//!
//! ## Core Workflow
//!
//! The engine is vendor-agnostic. It operates on a canonical graph plus the raw
//! per-action configuration it was built from:
//!
//! 1.  **Load Your Export**: Parse your CRM's workflow export into your own Rust structs.
//! 2.  **Normalize**: Implement [`IntoWorkflow`](workflow::IntoWorkflow) to turn it into a
//!     [`WorkflowGraph`](graph::WorkflowGraph) and [`WorkflowMetadata`](workflow::WorkflowMetadata).
//!     Building the graph checks that every edge points at a real node.
//! 3.  **Configure**: Use [`Analyzer::builder`](analyzer::Analyzer::builder) to tune penalties,
//!     scoring weights and vendor type aliases, or load them from an
//!     [`AnalyzerConfig`](config::AnalyzerConfig) file.
//! 4.  **Analyze**: `analyze` never fails; problems in the workflow come back as issues.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowaudit::prelude::*;
//! use serde_json::json;
//!
//! let nodes = vec![
//!     Node::new("t1", NodeKind::Trigger, "form_submitted"),
//!     Node::new("a1", NodeKind::Action, "SendEmail"),
//!     Node::new("a2", NodeKind::Action, "Webhook"),
//! ];
//! let edges = vec![Edge::new("e1", "t1", "a1"), Edge::new("e2", "a1", "a2")];
//! let graph = WorkflowGraph::new(nodes, edges).unwrap();
//!
//! let welcome = json!({"to": "{{contact.email}}", "subject": "Welcome!", "validation": "required"});
//! let hook = json!({"url": "https://hooks.example.com/in", "timeout": 10, "onError": "skip"});
//! let workflow = WorkflowMetadata::new("wf-1", "Welcome series").with_actions(vec![
//!     ActionRecord::new("a1", "SendEmail").with_config(welcome.as_object().unwrap().clone()),
//!     ActionRecord::new("a2", "Webhook").with_config(hook.as_object().unwrap().clone()),
//! ]);
//!
//! let analyzer = Analyzer::builder().with_type_alias("fireHook", "webhook").build();
//! let result = analyzer.analyze(&graph, &workflow);
//!
//! assert_eq!(result.health_score, 100);
//! assert_eq!(result.grade, Grade::Excellent);
//! println!("{}", ReportFormatter::format(&result));
//! ```

pub mod analyzer;
pub mod config;
pub mod detectors;
pub mod error;
pub mod graph;
pub mod issue;
pub mod performance;
pub mod prelude;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod vocabulary;
pub mod workflow;

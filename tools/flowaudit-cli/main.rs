use clap::{Parser, ValueEnum};
use flowaudit::prelude::*;
use flowaudit::vocabulary::{ActionKind, Vocabulary};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Export Format Specific) ---
// The export carries the workflow metadata plus the transitions between steps.
// Metadata is read by `WorkflowMetadata` itself; these structs only pick out the topology.

#[derive(Deserialize)]
struct RawTopology {
    #[serde(default)]
    triggers: Vec<RawStep>,
    #[serde(default)]
    actions: Vec<RawStep>,
}

#[derive(Deserialize)]
struct RawStep {
    id: String,
    #[serde(rename = "type", alias = "actionType")]
    step_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default)]
    next: Vec<String>,
    #[serde(default)]
    branches: Vec<RawBranch>,
}

#[derive(Deserialize)]
struct RawBranch {
    #[serde(default)]
    label: Option<String>,
    target: String,
}

struct RawExport<'a> {
    metadata: WorkflowMetadata,
    topology: RawTopology,
    vocabulary: &'a Vocabulary,
}

/// How the analysis result is printed.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

// --- Converter Implementation ---
// Triggers become trigger nodes, actions become action or condition nodes
// depending on their type, `next` and `branches` become edges.

impl IntoWorkflow for RawExport<'_> {
    fn into_workflow(self) -> Result<NormalizedWorkflow, WorkflowConversionError> {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        let steps = self
            .topology
            .triggers
            .into_iter()
            .map(|step| (NodeKind::Trigger, step))
            .chain(self.topology.actions.into_iter().map(|step| {
                let kind = if self.vocabulary.kind_of(&step.step_type) == ActionKind::Condition {
                    NodeKind::Condition
                } else {
                    NodeKind::Action
                };
                (kind, step)
            }));

        for (kind, step) in steps {
            if step.id.trim().is_empty() {
                return Err(WorkflowConversionError::Validation(format!(
                    "a '{}' step has an empty id",
                    step.step_type
                )));
            }
            for target in step.next {
                let id = format!("e{}", edges.len() + 1);
                edges.push(Edge::new(id, step.id.as_str(), target));
            }
            for branch in step.branches {
                let id = format!("e{}", edges.len() + 1);
                let edge = Edge::new(id, step.id.as_str(), branch.target);
                edges.push(match branch.label {
                    Some(label) => edge.with_condition(label),
                    None => edge,
                });
            }
            let label = if step.name.trim().is_empty() {
                step.id.clone()
            } else {
                step.name
            };
            nodes.push(
                Node::new(step.id, kind, step.step_type)
                    .with_label(label)
                    .with_config(step.config),
            );
        }

        let graph = WorkflowGraph::new(nodes, edges)?;
        Ok(NormalizedWorkflow {
            graph,
            metadata: self.metadata,
        })
    }
}

/// Audits a CRM workflow export and prints its health report
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow export JSON file
    workflow_path: String,

    /// Optional path to an analyzer config JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run_analysis(cli);
}

fn run_analysis(cli: Cli) {
    let start = Instant::now();

    // --- 1. Configuration ---
    let builder = Analyzer::builder();
    let builder = match &cli.config {
        Some(path) => builder.with_config(
            AnalyzerConfig::from_file(path)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        ),
        None => builder,
    };
    let analyzer = builder.build();

    // --- 2. Parsing and Conversion ---
    let export_json = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });
    let raw: Value = serde_json::from_str(&export_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow JSON: {}", e)));
    let metadata: WorkflowMetadata = serde_json::from_value(raw.clone())
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow metadata: {}", e)));
    let topology: RawTopology = serde_json::from_value(raw)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow steps: {}", e)));

    let workflow = RawExport {
        metadata,
        topology,
        vocabulary: analyzer.vocabulary(),
    }
    .into_workflow()
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert workflow: {}", e)));

    // --- 3. Analysis ---
    let result = analyzer.analyze_normalized(&workflow);
    tracing::info!(elapsed = ?start.elapsed(), "analysis complete");

    // --- 4. Output ---
    match cli.format {
        OutputFormat::Text => print!("{}", ReportFormatter::display(&result)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to serialize result: {}", e))
            });
            println!("{}", json);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

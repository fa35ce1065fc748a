use super::WorkflowMetadata;
use crate::error::WorkflowConversionError;
use crate::graph::WorkflowGraph;

/// The canonical input to the analyzer: a validated graph plus the raw
/// per-action configuration it was built from.
#[derive(Debug, Clone)]
pub struct NormalizedWorkflow {
    pub graph: WorkflowGraph,
    pub metadata: WorkflowMetadata,
}

/// A trait for CRM-specific workflow exports that can be converted into the
/// analyzer's canonical model.
///
/// This is the normalizer boundary. Implementations decide which vendor
/// steps become triggers, actions or conditions and how transitions map to
/// edges. Building the graph with [`WorkflowGraph::new`] guarantees every edge
/// points at a real node before analysis starts.
///
/// # Example
///
/// ```rust
/// use flowaudit::prelude::*;
///
/// struct Export {
///     steps: Vec<(String, String)>,
/// }
///
/// impl IntoWorkflow for Export {
///     fn into_workflow(self) -> Result<NormalizedWorkflow, WorkflowConversionError> {
///         let mut metadata = WorkflowMetadata::new("wf-1", "Welcome series");
///         let mut nodes = Vec::new();
///         for (id, tag) in self.steps {
///             metadata.actions.push(ActionRecord::new(id.as_str(), tag.as_str()));
///             nodes.push(Node::new(id, NodeKind::Action, tag));
///         }
///         let graph = WorkflowGraph::new(nodes, vec![])?;
///         Ok(NormalizedWorkflow { graph, metadata })
///     }
/// }
///
/// let export = Export { steps: vec![("a1".into(), "SendEmail".into())] };
/// let workflow = export.into_workflow().unwrap();
/// assert_eq!(workflow.graph.node_count(), 1);
/// ```
pub trait IntoWorkflow {
    /// Consumes the export and converts it into a graph and its metadata.
    fn into_workflow(self) -> Result<NormalizedWorkflow, WorkflowConversionError>;
}

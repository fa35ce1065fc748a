//! Canonical trigger/action graph and the structural analyses that run on it.

use crate::error::GraphError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod cycles;
mod reachability;
mod topology;
mod triggers;

pub use cycles::{DEFAULT_CYCLE_LIMIT, Loop, detect_cycles, detect_cycles_with_limit};
pub use reachability::detect_dead_branches;
pub use topology::topological_sort;
pub use triggers::{TriggerConflict, conflict_severity, detect_trigger_conflicts, trigger_signature};

/// The structural role a node plays in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Trigger,
    Action,
    Condition,
    Unknown,
}

/// A single trigger, action or decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Raw vendor identifier, e.g. `"SendEmail"`.
    pub type_tag: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub label: String,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, type_tag: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            type_tag: type_tag.into(),
            config: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Case-insensitive config lookup.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        config_lookup(&self.config, key)
    }
}

/// A directed transition. A `condition_label` marks a guarded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_label: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            condition_label: None,
        }
    }

    pub fn with_condition(mut self, label: impl Into<String>) -> Self {
        self.condition_label = Some(label.into());
        self
    }
}

/// A validated workflow graph.
///
/// Node lookup is backed by an id index and outgoing edges are precomputed, so
/// traversals never scan the node list. Node order is the order nodes were
/// supplied in and is what every analysis uses as its stable order.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: AHashMap<String, usize>,
    /// node index -> (edge index, target node index)
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl WorkflowGraph {
    /// Builds a graph, rejecting duplicate node ids and edges with dangling endpoints.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (e, edge) in edges.iter().enumerate() {
            let resolve = |node_id: &str| {
                index
                    .get(node_id)
                    .copied()
                    .ok_or_else(|| GraphError::UnknownEdgeEndpoint {
                        edge_id: edge.id.clone(),
                        node_id: node_id.to_string(),
                    })
            };
            let source = resolve(&edge.source)?;
            let target = resolve(&edge.target)?;
            adjacency[source].push((e, target));
        }

        Ok(Self {
            nodes,
            edges,
            index,
            adjacency,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.index.get(node_id).map(|&i| &self.nodes[i])
    }

    /// Outgoing edges of a node, in edge-list order.
    pub fn outgoing_edges<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.index
            .get(node_id)
            .map(|&i| self.adjacency[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&(e, _)| &self.edges[e])
    }

    pub fn trigger_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Trigger)
    }

    /// Cyclomatic complexity proxy: `edges - nodes + 2`.
    pub fn branch_approximation(&self) -> i64 {
        self.edges.len() as i64 - self.nodes.len() as i64 + 2
    }

    /// True when the edge set admits a topological order.
    pub fn is_dag(&self) -> bool {
        topological_sort(&self.edges).is_some()
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn adjacency_of(&self, index: usize) -> &[(usize, usize)] {
        &self.adjacency[index]
    }
}

/// Case-insensitive key lookup in a config object.
pub fn config_lookup<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    config.get(key).or_else(|| {
        config
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

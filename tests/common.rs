//! Common test utilities for building workflow graphs and metadata.
use flowaudit::prelude::*;
use serde_json::{Map, Value};

/// Turns a `json!` object literal into a config map.
#[allow(dead_code)]
pub fn config(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("config must be a JSON object, got {}", other),
    }
}

#[allow(dead_code)]
pub fn trigger(id: &str, tag: &str) -> Node {
    Node::new(id, NodeKind::Trigger, tag)
}

#[allow(dead_code)]
pub fn action(id: &str, tag: &str) -> Node {
    Node::new(id, NodeKind::Action, tag)
}

#[allow(dead_code)]
pub fn condition(id: &str) -> Node {
    Node::new(id, NodeKind::Condition, "Condition")
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> Edge {
    Edge::new(format!("{}->{}", source, target), source, target)
}

/// Builds a graph from nodes and `(source, target)` pairs.
#[allow(dead_code)]
pub fn graph(nodes: Vec<Node>, edges: &[(&str, &str)]) -> WorkflowGraph {
    let edges = edges.iter().map(|(s, t)| edge(s, t)).collect();
    WorkflowGraph::new(nodes, edges).expect("test graph is well-formed")
}

/// Mirrors the raw action list into graph nodes, hung off a single trigger in a chain.
///
/// `t1 -> a[0] -> a[1] -> ...`
#[allow(dead_code)]
pub fn linear_workflow(actions: Vec<ActionRecord>) -> (WorkflowGraph, WorkflowMetadata) {
    let mut nodes = vec![trigger("t1", "form_submitted")];
    let mut edges = Vec::new();
    let mut previous = "t1".to_string();
    for record in &actions {
        nodes.push(
            Node::new(record.id.as_str(), NodeKind::Action, record.action_type.as_str())
                .with_config(record.config.clone()),
        );
        edges.push(edge(&previous, &record.id));
        previous = record.id.clone();
    }
    let graph = WorkflowGraph::new(nodes, edges).expect("linear graph is well-formed");
    let metadata = WorkflowMetadata::new("wf-test", "Test workflow").with_actions(actions);
    (graph, metadata)
}

/// An email action with a recipient and a validated greeting.
#[allow(dead_code)]
pub fn healthy_email(id: &str) -> ActionRecord {
    ActionRecord::new(id, "SendEmail").with_config(config(serde_json::json!({
        "to": format!("{}@example.com", id),
        "subject": "Hello {{contact.first_name | default: \"there\"}}",
    })))
}

/// A webhook that has a public URL, a timeout and an error branch.
#[allow(dead_code)]
pub fn healthy_webhook(id: &str) -> ActionRecord {
    ActionRecord::new(id, "Webhook").with_config(config(serde_json::json!({
        "url": "https://hooks.example.com/in",
        "timeout": 10,
        "onError": "continue",
    })))
}

#[allow(dead_code)]
pub fn empty_graph() -> WorkflowGraph {
    WorkflowGraph::new(vec![], vec![]).expect("empty graph is well-formed")
}

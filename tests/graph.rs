//! Tests for the structural graph analyses.
mod common;
use common::*;
use flowaudit::error::GraphError;
use flowaudit::graph::{
    detect_cycles, detect_cycles_with_limit, detect_dead_branches, detect_trigger_conflicts,
    topological_sort,
};
use flowaudit::prelude::*;
use serde_json::json;

#[test]
fn test_dangling_edge_is_rejected() {
    let err = WorkflowGraph::new(
        vec![trigger("t1", "form_submitted")],
        vec![edge("t1", "ghost")],
    )
    .unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownEdgeEndpoint {
            edge_id: "t1->ghost".to_string(),
            node_id: "ghost".to_string(),
        }
    );
}

#[test]
fn test_duplicate_node_id_is_rejected() {
    let err = WorkflowGraph::new(vec![action("a", "SendEmail"), action("a", "Delay")], vec![])
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNodeId { node_id } if node_id == "a"));
}

#[test]
fn test_empty_graph_has_no_cycles() {
    assert!(detect_cycles(&empty_graph()).is_empty());
    assert_eq!(topological_sort(&[]), Some(vec![]));
}

#[test]
fn test_three_node_cycle_without_condition() {
    let g = graph(
        vec![
            action("a", "SendEmail"),
            action("b", "Delay"),
            action("c", "AddTag"),
        ],
        &[("a", "b"), ("b", "c"), ("c", "a")],
    );
    let loops = detect_cycles(&g);
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].nodes, vec!["a", "b", "c"]);
    assert!(!loops[0].has_exit_condition);
    assert!(loops[0].description.contains("a -> b -> c -> a"));
}

#[test]
fn test_condition_with_outside_target_is_an_exit() {
    let g = graph(
        vec![
            action("a", "SendEmail"),
            condition("check"),
            action("done", "AddTag"),
        ],
        &[("a", "check"), ("check", "a"), ("check", "done")],
    );
    let loops = detect_cycles(&g);
    assert_eq!(loops.len(), 1);
    assert!(loops[0].has_exit_condition);
}

#[test]
fn test_condition_without_outside_target_is_not_an_exit() {
    let g = graph(
        vec![action("a", "SendEmail"), condition("check")],
        &[("a", "check"), ("check", "a")],
    );
    let loops = detect_cycles(&g);
    assert_eq!(loops.len(), 1);
    assert!(!loops[0].has_exit_condition);
}

#[test]
fn test_self_loop_is_a_cycle_of_length_one() {
    let g = graph(vec![action("a", "Webhook")], &[("a", "a")]);
    let loops = detect_cycles(&g);
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].nodes, vec!["a"]);
    assert!(!loops[0].has_exit_condition);
    assert_eq!(topological_sort(g.edges()), None);
}

#[test]
fn test_cycles_are_deduplicated_by_node_set() {
    // Every start node rediscovers the same two-node cycle.
    let g = graph(
        vec![trigger("t", "tag_added"), action("a", "Delay"), action("b", "Delay")],
        &[("t", "a"), ("a", "b"), ("b", "a")],
    );
    assert_eq!(detect_cycles(&g).len(), 1);
}

#[test]
fn test_topological_sort_orders_a_dag() {
    let g = graph(
        vec![
            trigger("t", "form_submitted"),
            action("a", "SendEmail"),
            action("b", "SendSms"),
            action("c", "AddTag"),
        ],
        &[("t", "a"), ("t", "b"), ("a", "c"), ("b", "c")],
    );
    let order = topological_sort(g.edges()).unwrap();
    let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
    assert_eq!(order.len(), 4);
    assert!(pos("t") < pos("a"));
    assert!(pos("a") < pos("c"));
    assert!(pos("b") < pos("c"));
    assert!(g.is_dag());
    assert!(detect_cycles(&g).is_empty());
}

#[test]
fn test_topology_and_cycle_detection_agree() {
    let shapes: Vec<Vec<(&str, &str)>> = vec![
        vec![("a", "b"), ("b", "c")],
        vec![("a", "b"), ("b", "a")],
        vec![("a", "b"), ("b", "c"), ("c", "d"), ("d", "b")],
        vec![("a", "a")],
        vec![("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        vec![("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"), ("e", "d")],
    ];
    for edges in shapes {
        let nodes = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| action(id, "Delay"))
            .collect();
        let g = graph(nodes, &edges);
        let sorted = topological_sort(g.edges());
        let cycles = detect_cycles(&g);
        assert_eq!(sorted.is_none(), !cycles.is_empty(), "edges: {:?}", edges);
    }
}

#[test]
fn test_cycle_cap_bounds_enumeration() {
    // A complete digraph on 8 nodes has far more than 5 simple cycles.
    let ids: Vec<String> = (0..8).map(|i| format!("n{}", i)).collect();
    let nodes = ids.iter().map(|id| action(id, "Delay")).collect();
    let pairs: Vec<(&str, &str)> = ids
        .iter()
        .flat_map(|s| ids.iter().filter(move |t| *t != s).map(move |t| (s.as_str(), t.as_str())))
        .collect();
    let g = graph(nodes, &pairs);

    assert_eq!(detect_cycles_with_limit(&g, 5).len(), 5);
    assert!(detect_cycles(&g).len() <= 64);
    assert!(!detect_cycles_with_limit(&g, 1).is_empty());
}

#[test]
fn test_dead_branches_without_triggers_are_empty() {
    let g = graph(
        vec![action("a", "SendEmail"), action("b", "Delay"), action("orphan", "AddTag")],
        &[("a", "b")],
    );
    assert!(detect_dead_branches(&g).is_empty());
}

#[test]
fn test_dead_branches_from_multiple_triggers() {
    let g = graph(
        vec![
            trigger("t1", "form_submitted"),
            trigger("t2", "tag_added"),
            action("a", "SendEmail"),
            action("b", "SendSms"),
            action("z_orphan", "AddTag"),
            action("m_orphan", "Delay"),
        ],
        &[("t1", "a"), ("t2", "b"), ("z_orphan", "m_orphan")],
    );
    let dead: Vec<String> = detect_dead_branches(&g).into_iter().collect();
    assert_eq!(dead, vec!["m_orphan", "z_orphan"]);
}

#[test]
fn test_unreached_triggers_are_never_dead() {
    let g = graph(
        vec![trigger("t1", "form_submitted"), trigger("t2", "tag_added")],
        &[],
    );
    assert!(detect_dead_branches(&g).is_empty());
}

#[test]
fn test_trigger_conflicts_group_by_signature() {
    let form = |id: &str, form_id: &str| {
        trigger(id, "FormSubmitted").with_config(config(json!({"formId": form_id})))
    };
    let nodes = vec![
        form("t1", "f-1"),
        form("t2", "f-1"),
        form("t3", "f-2"),
        trigger("t4", "form_submitted").with_config(config(json!({"formId": "f-1"}))),
        action("a", "SendEmail"),
    ];
    let conflicts = detect_trigger_conflicts(&nodes);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].triggers, vec!["t1", "t2", "t4"]);
    assert_eq!(conflicts[0].severity, Severity::High);
}

#[test]
fn test_trigger_conflict_severity_scales_with_contention() {
    for (count, expected) in [
        (2, Severity::Medium),
        (3, Severity::High),
        (4, Severity::High),
        (5, Severity::Critical),
        (8, Severity::Critical),
    ] {
        let nodes: Vec<Node> = (0..count)
            .map(|i| trigger(&format!("t{}", i), "contact_created"))
            .collect();
        let conflicts = detect_trigger_conflicts(&nodes);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, expected, "{} triggers", count);
    }
}

#[test]
fn test_distinct_filters_do_not_conflict() {
    let nodes = vec![
        trigger("t1", "tag_added").with_config(config(json!({"tag": "vip"}))),
        trigger("t2", "tag_added").with_config(config(json!({"tag": "trial"}))),
    ];
    assert!(detect_trigger_conflicts(&nodes).is_empty());
}

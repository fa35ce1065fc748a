use super::{NodeKind, WorkflowGraph};
use std::collections::{BTreeSet, VecDeque};

/// Ids of non-trigger nodes that no trigger can reach.
///
/// The search is a breadth-first traversal seeded with every trigger node at
/// once. Without any trigger there is no entry point to reason from, so the
/// result is empty rather than "everything is dead".
pub fn detect_dead_branches(graph: &WorkflowGraph) -> BTreeSet<String> {
    let mut visited = vec![false; graph.node_count()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for (idx, node) in graph.nodes().iter().enumerate() {
        if node.kind == NodeKind::Trigger {
            visited[idx] = true;
            queue.push_back(idx);
        }
    }

    if queue.is_empty() {
        return BTreeSet::new();
    }

    while let Some(idx) = queue.pop_front() {
        for &(_, next) in graph.adjacency_of(idx) {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }

    graph
        .nodes()
        .iter()
        .zip(visited)
        .filter(|(node, seen)| !seen && node.kind != NodeKind::Trigger)
        .map(|(node, _)| node.id.clone())
        .collect()
}

use super::{NodeKind, WorkflowGraph};
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of cycles reported for a single graph.
pub const DEFAULT_CYCLE_LIMIT: usize = 64;

/// One structural cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loop {
    /// Cycle members in traversal order. The first node is where the cycle closes.
    pub nodes: Vec<String>,
    /// Whether a condition node on the cycle can route execution out of it.
    pub has_exit_condition: bool,
    pub description: String,
}

/// Finds simple cycles with the default cap of [`DEFAULT_CYCLE_LIMIT`].
///
/// See [`detect_cycles_with_limit`].
pub fn detect_cycles(graph: &WorkflowGraph) -> Vec<Loop> {
    detect_cycles_with_limit(graph, DEFAULT_CYCLE_LIMIT)
}

/// Finds simple cycles reachable through directed edges, deduplicated by node set.
///
/// A depth-first search is started from every node in graph order. Each back
/// edge to a node still on the DFS stack yields the stack slice from that node
/// to the current one. Enumeration stops at the first distinct cycle found after
/// `limit` have been collected, so on dense graphs the result is a bounded
/// sample rather than an exhaustive list. Every graph that is not a DAG yields
/// at least one cycle when `limit > 0`.
pub fn detect_cycles_with_limit(graph: &WorkflowGraph, limit: usize) -> Vec<Loop> {
    let finder = enumerate(graph, limit);
    if finder.truncated {
        tracing::warn!(
            limit,
            nodes = graph.node_count(),
            "cycle enumeration stopped at the configured cap"
        );
    }

    finder
        .cycles
        .iter()
        .map(|cycle| classify(graph, cycle))
        .collect()
}

fn enumerate(graph: &WorkflowGraph, limit: usize) -> CycleFinder<'_> {
    let mut finder = CycleFinder::new(graph, limit);
    for start in 0..graph.node_count() {
        finder.search_from(start);
        if finder.truncated {
            break;
        }
    }
    finder
}

struct CycleFinder<'a> {
    graph: &'a WorkflowGraph,
    limit: usize,
    seen: AHashSet<Vec<usize>>,
    cycles: Vec<Vec<usize>>,
    /// Set once a new cycle had to be dropped because the cap was reached.
    truncated: bool,
}

impl<'a> CycleFinder<'a> {
    fn new(graph: &'a WorkflowGraph, limit: usize) -> Self {
        Self {
            graph,
            limit,
            seen: AHashSet::new(),
            cycles: Vec::new(),
            truncated: false,
        }
    }

    fn is_full(&self) -> bool {
        self.cycles.len() >= self.limit
    }

    /// Iterative DFS so that long chains cannot overflow the call stack.
    fn search_from(&mut self, start: usize) {
        let graph = self.graph;
        let n = graph.node_count();
        let mut visited = vec![false; n];
        let mut on_stack = vec![false; n];
        let mut path = vec![start];
        // (node, position of the next outgoing edge to follow)
        let mut frames = vec![(start, 0usize)];
        visited[start] = true;
        on_stack[start] = true;

        while let Some(frame) = frames.last_mut() {
            let (node, cursor) = *frame;
            let successors = graph.adjacency_of(node);

            if cursor >= successors.len() {
                on_stack[node] = false;
                path.pop();
                frames.pop();
                continue;
            }
            frame.1 += 1;

            let (_, next) = successors[cursor];
            if on_stack[next] {
                if let Some(pos) = path.iter().position(|&p| p == next) {
                    self.record(&path[pos..]);
                    if self.truncated {
                        return;
                    }
                }
            } else if !visited[next] {
                visited[next] = true;
                on_stack[next] = true;
                path.push(next);
                frames.push((next, 0));
            }
        }
    }

    fn record(&mut self, cycle: &[usize]) {
        let mut key = cycle.to_vec();
        key.sort_unstable();
        if self.seen.contains(&key) {
            return;
        }
        if self.is_full() {
            self.truncated = true;
            return;
        }
        self.seen.insert(key);
        self.cycles.push(cycle.to_vec());
    }
}

/// A cycle has an exit when one of its condition nodes has an edge leaving the cycle.
fn classify(graph: &WorkflowGraph, cycle: &[usize]) -> Loop {
    let members: AHashSet<usize> = cycle.iter().copied().collect();

    let exit_node = cycle.iter().copied().find(|&idx| {
        graph.node_at(idx).kind == NodeKind::Condition
            && graph
                .adjacency_of(idx)
                .iter()
                .any(|(_, target)| !members.contains(target))
    });

    let nodes: Vec<String> = cycle.iter().map(|&i| graph.node_at(i).id.clone()).collect();
    let path = nodes
        .iter()
        .chain(nodes.first())
        .map(String::as_str)
        .join(" -> ");

    let description = match exit_node {
        Some(idx) => format!(
            "Loop {} can exit through condition '{}'",
            path,
            graph.node_at(idx).id
        ),
        None => format!("Loop {} has no exit condition and will repeat forever", path),
    };

    Loop {
        nodes,
        has_exit_condition: exit_node.is_some(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn chain(ids: &[&str], kind: NodeKind, edges: &[(&str, &str)]) -> WorkflowGraph {
        let nodes = ids.iter().map(|id| Node::new(*id, kind, "SendEmail")).collect();
        let edges = edges
            .iter()
            .enumerate()
            .map(|(i, (s, t))| Edge::new(format!("e{}", i), *s, *t))
            .collect();
        WorkflowGraph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_cycle_slice_starts_at_closing_node() {
        let graph = chain(
            &["a", "b", "c", "d"],
            NodeKind::Action,
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "b")],
        );
        let loops = detect_cycles(&graph);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].nodes, vec!["b", "c", "d"]);
        assert!(loops[0].description.contains("b -> c -> d -> b"));
    }

    #[test]
    fn test_same_cycle_from_different_starts_is_reported_once() {
        let graph = chain(
            &["a", "b", "c"],
            NodeKind::Action,
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        assert_eq!(detect_cycles(&graph).len(), 1);
    }

    #[test]
    fn test_cap_reached_exactly_is_not_truncation() {
        let graph = chain(&["a", "b"], NodeKind::Action, &[("a", "b"), ("b", "a")]);
        let finder = enumerate(&graph, 1);
        assert_eq!(finder.cycles.len(), 1);
        assert!(!finder.truncated);
    }

    #[test]
    fn test_cap_overflow_is_truncation() {
        let graph = chain(
            &["a", "b", "c"],
            NodeKind::Action,
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")],
        );
        assert!(!enumerate(&graph, 2).truncated);

        let finder = enumerate(&graph, 1);
        assert_eq!(finder.cycles.len(), 1);
        assert!(finder.truncated);
    }

    #[test]
    fn test_overflow_in_last_start_node_is_truncation() {
        // The self-loop on `c` is only found by the search from `c`, the last start.
        let graph = chain(
            &["a", "b", "c"],
            NodeKind::Action,
            &[("a", "b"), ("b", "a"), ("c", "c")],
        );
        let finder = enumerate(&graph, 1);
        assert!(finder.truncated);
    }

    #[test]
    fn test_zero_limit_reports_nothing() {
        let graph = chain(&["a", "b"], NodeKind::Action, &[("a", "b"), ("b", "a")]);
        assert!(detect_cycles_with_limit(&graph, 0).is_empty());
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let ids: Vec<String> = (0..5_000).map(|i| format!("n{}", i)).collect();
        let nodes = ids
            .iter()
            .map(|id| Node::new(id.as_str(), NodeKind::Action, "SendEmail"))
            .collect();
        let edges = ids
            .windows(2)
            .enumerate()
            .map(|(i, w)| Edge::new(format!("e{}", i), w[0].as_str(), w[1].as_str()))
            .collect();
        let graph = WorkflowGraph::new(nodes, edges).unwrap();
        assert!(detect_cycles_with_limit(&graph, 1).is_empty());
    }
}

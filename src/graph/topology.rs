use super::Edge;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Kahn-style topological ordering over the nodes mentioned by `edges`.
///
/// Returns `None` if and only if the edges contain a cycle. Nodes are released
/// in first-mention order, so the result is deterministic for a given edge list.
pub fn topological_sort(edges: &[Edge]) -> Option<Vec<String>> {
    let mut ids: Vec<&str> = Vec::new();
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut successors: Vec<Vec<usize>> = Vec::new();
    let mut in_degree: Vec<usize> = Vec::new();

    for edge in edges {
        let source = position_of(&edge.source, &mut ids, &mut index);
        let target = position_of(&edge.target, &mut ids, &mut index);
        if successors.len() < ids.len() {
            successors.resize(ids.len(), Vec::new());
            in_degree.resize(ids.len(), 0);
        }
        successors[source].push(target);
        in_degree[target] += 1;
    }

    let mut ready: VecDeque<usize> = (0..ids.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(ids.len());

    while let Some(node) = ready.pop_front() {
        order.push(ids[node].to_string());
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    (order.len() == ids.len()).then_some(order)
}

fn position_of<'a>(
    id: &'a str,
    ids: &mut Vec<&'a str>,
    index: &mut AHashMap<&'a str, usize>,
) -> usize {
    *index.entry(id).or_insert_with(|| {
        ids.push(id);
        ids.len() - 1
    })
}

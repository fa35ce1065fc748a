use super::{DetectionInput, IssueDetector};
use crate::graph::{detect_cycles_with_limit, detect_dead_branches, detect_trigger_conflicts};
use crate::issue::{Issue, IssueCategory};

/// Cyclomatic approximations above this are flagged.
pub const COMPLEXITY_THRESHOLD: i64 = 20;

/// Cycles that no condition can break out of.
pub struct InfiniteLoopDetector;

impl IssueDetector for InfiniteLoopDetector {
    fn id(&self) -> &str {
        "infinite_loop"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::InfiniteLoop
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let loops = detect_cycles_with_limit(input.graph, input.cycle_limit);
        tracing::debug!(cycles = loops.len(), "cycle detection finished");

        loops
            .into_iter()
            .filter(|l| !l.has_exit_condition)
            .map(|l| {
                input.issue(
                    IssueCategory::InfiniteLoop,
                    l.nodes,
                    l.description,
                    "Add a condition step inside the loop that routes contacts out once they are done, or remove the edge that closes the loop.",
                )
            })
            .collect()
    }
}

/// Triggers that race on the same event.
pub struct TriggerConflictDetector;

impl IssueDetector for TriggerConflictDetector {
    fn id(&self) -> &str {
        "trigger_conflict"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::TriggerConflict
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        detect_trigger_conflicts(input.graph.nodes())
            .into_iter()
            .map(|conflict| {
                input.issue(
                    IssueCategory::TriggerConflict,
                    conflict.triggers,
                    format!("{} (contention: {})", conflict.description, conflict.severity),
                    "Merge the overlapping triggers into one, or give each a distinct filter so a contact enters the workflow only once.",
                )
            })
            .collect()
    }
}

/// Steps no trigger can ever reach.
pub struct DeadBranchDetector;

impl IssueDetector for DeadBranchDetector {
    fn id(&self) -> &str {
        "dead_branch"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeadBranch
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let dead = detect_dead_branches(input.graph);
        tracing::debug!(dead_branches = dead.len(), "reachability analysis finished");

        dead.into_iter()
            .map(|node_id| {
                let label = input
                    .graph
                    .get_node(&node_id)
                    .map(|n| n.label.clone())
                    .unwrap_or_else(|| node_id.clone());
                input.issue(
                    IssueCategory::DeadBranch,
                    vec![node_id],
                    format!("Step '{}' cannot be reached from any trigger", label),
                    "Connect the step to the flow or delete it.",
                )
            })
            .collect()
    }
}

pub struct HighComplexityDetector;

impl IssueDetector for HighComplexityDetector {
    fn id(&self) -> &str {
        "high_complexity"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::HighComplexity
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let branches = input.graph.branch_approximation();
        if branches <= COMPLEXITY_THRESHOLD {
            return vec![];
        }
        vec![input.issue(
            IssueCategory::HighComplexity,
            vec![],
            format!(
                "Workflow has an estimated {} independent paths across {} steps",
                branches,
                input.graph.node_count()
            ),
            "Split the workflow into smaller workflows chained by tags or goals.",
        )]
    }
}

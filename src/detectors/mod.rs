//! Independent issue detectors.
//!
//! Each detector is a pure function of the workflow: it reads the graph and the
//! raw action configuration and returns the issues it found. Detectors never
//! fail; a missing field is usually exactly what they are looking for.

use crate::graph::WorkflowGraph;
use crate::issue::{Issue, IssueCategory, PenaltyTable};
use crate::vocabulary::{ActionKind, Vocabulary};
use crate::workflow::{ActionRecord, WorkflowMetadata};
use ahash::AHashSet;
use serde_json::{Map, Value};

mod external;
mod fields;
mod hygiene;
mod structure;

pub use external::{
    MissingErrorHandlingDetector, MissingThrottlingDetector, MissingTimeoutDetector,
    PaymentRetryDetector, UnreachableEndpointDetector, is_unreachable_url,
};
pub use fields::{MissingRequiredFieldDetector, UnvalidatedContactFieldDetector, unvalidated_contact_fields};
pub use hygiene::{
    DeprecatedActionDetector, DuplicateActionDetector, ExcessiveWaitDetector,
    MissingDescriptionDetector, UnusedVariableDetector,
};
pub use structure::{
    COMPLEXITY_THRESHOLD, DeadBranchDetector, HighComplexityDetector, InfiniteLoopDetector,
    TriggerConflictDetector,
};

/// Everything a detector may look at.
pub struct DetectionInput<'a> {
    pub graph: &'a WorkflowGraph,
    pub workflow: &'a WorkflowMetadata,
    pub vocabulary: &'a Vocabulary,
    pub penalties: &'a PenaltyTable,
    pub cycle_limit: usize,
}

impl DetectionInput<'_> {
    pub fn kind_of(&self, action: &ActionRecord) -> ActionKind {
        self.vocabulary.kind_of(&action.action_type)
    }

    /// Builds an issue with the category's default severity and configured penalty.
    pub fn issue(
        &self,
        category: IssueCategory,
        node_ids: Vec<String>,
        description: String,
        fix: &str,
    ) -> Issue {
        Issue {
            severity: category.default_severity(),
            category,
            title: category.title().to_string(),
            description,
            node_ids,
            fix: fix.to_string(),
            penalty: self.penalties.get(category),
        }
    }
}

/// Defines the contract for a single issue category check.
pub trait IssueDetector: Send + Sync {
    fn id(&self) -> &str;
    fn category(&self) -> IssueCategory;
    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue>;
}

/// The builtin detectors in their fixed run order.
pub fn default_detectors() -> Vec<Box<dyn IssueDetector>> {
    vec![
        Box::new(MissingRequiredFieldDetector),
        Box::new(UnreachableEndpointDetector),
        Box::new(PaymentRetryDetector),
        Box::new(InfiniteLoopDetector),
        Box::new(TriggerConflictDetector),
        Box::new(MissingErrorHandlingDetector),
        Box::new(MissingTimeoutDetector),
        Box::new(MissingThrottlingDetector),
        Box::new(UnvalidatedContactFieldDetector),
        Box::new(DeadBranchDetector),
        Box::new(ExcessiveWaitDetector),
        Box::new(HighComplexityDetector),
        Box::new(DuplicateActionDetector),
        Box::new(UnusedVariableDetector),
        Box::new(MissingDescriptionDetector),
        Box::new(DeprecatedActionDetector),
    ]
}

/// Runs one detector and drops repeated findings.
pub fn run_detector(detector: &dyn IssueDetector, input: &DetectionInput<'_>) -> Vec<Issue> {
    let issues = dedup_issues(detector.detect(input));
    tracing::trace!(
        detector = detector.id(),
        issues = issues.len(),
        "detector finished"
    );
    issues
}

/// Keeps the first issue for each `(category, node ids)` pair.
///
/// Workflow-level issues carry no node ids and are told apart by description.
pub fn dedup_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen: AHashSet<(IssueCategory, Vec<String>, String)> = AHashSet::new();
    issues
        .into_iter()
        .filter(|issue| {
            let detail = if issue.node_ids.is_empty() {
                issue.description.clone()
            } else {
                String::new()
            };
            seen.insert((issue.category, issue.node_ids.clone(), detail))
        })
        .collect()
}

/// A config value counts when it carries information: not null, not an empty
/// string or collection, and not `false`.
pub(crate) fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

/// True when any of `keys` is set on the config, compared case-insensitively.
pub(crate) fn has_any_key(config: &Map<String, Value>, keys: &[&str]) -> bool {
    config
        .iter()
        .any(|(k, v)| keys.iter().any(|key| k.eq_ignore_ascii_case(key)) && is_set(v))
}

/// The first set value among `keys`.
pub(crate) fn first_set<'a>(config: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        config
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && is_set(v))
            .map(|(_, v)| v)
    })
}

/// Every string nested anywhere in a config object.
pub(crate) fn config_strings(config: &Map<String, Value>) -> Vec<&str> {
    fn walk<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
        match value {
            Value::String(s) => out.push(s),
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    config.values().for_each(|v| walk(v, &mut out));
    out
}

use super::{Node, NodeKind};
use crate::issue::Severity;
use crate::vocabulary::normalize_tag;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Config keys that narrow when a trigger fires. Two triggers with the same
/// type tag and the same values for these keys fire on the same events.
const MATCH_CRITERIA_KEYS: &[&str] = &[
    "event",
    "eventtype",
    "filter",
    "filters",
    "formid",
    "listid",
    "tag",
    "tagid",
    "pipelineid",
    "stageid",
    "campaignid",
    "segmentid",
];

/// Two or more triggers whose firing conditions overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConflict {
    pub triggers: Vec<String>,
    pub severity: Severity,
    pub description: String,
}

/// Normalized firing signature of a trigger: its type tag plus its matching criteria.
pub fn trigger_signature(node: &Node) -> String {
    let criteria = node
        .config
        .iter()
        .filter_map(|(key, value)| {
            let key = normalize_tag(key);
            MATCH_CRITERIA_KEYS
                .contains(&key.as_str())
                .then(|| format!("{}={}", key, value))
        })
        .sorted()
        .join(";");
    format!("{}|{}", normalize_tag(&node.type_tag), criteria)
}

/// Contention policy: more triggers racing on the same event is worse.
pub fn conflict_severity(trigger_count: usize) -> Severity {
    match trigger_count {
        0..=2 => Severity::Medium,
        3..=4 => Severity::High,
        _ => Severity::Critical,
    }
}

/// Groups trigger nodes by firing signature and reports every group of two or more.
///
/// Groups are reported in the order their first member appears.
pub fn detect_trigger_conflicts(nodes: &[Node]) -> Vec<TriggerConflict> {
    let mut group_of: AHashMap<String, usize> = AHashMap::new();
    let mut groups: Vec<(String, Vec<&Node>)> = Vec::new();

    for node in nodes.iter().filter(|n| n.kind == NodeKind::Trigger) {
        let signature = trigger_signature(node);
        match group_of.get(&signature) {
            Some(&g) => groups[g].1.push(node),
            None => {
                group_of.insert(signature.clone(), groups.len());
                groups.push((signature, vec![node]));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(_, members)| {
            let triggers: Vec<String> = members.iter().map(|n| n.id.clone()).collect();
            TriggerConflict {
                severity: conflict_severity(triggers.len()),
                description: format!(
                    "{} triggers fire on the same '{}' event: {}",
                    triggers.len(),
                    members[0].type_tag,
                    triggers.join(", ")
                ),
                triggers,
            }
        })
        .collect()
}

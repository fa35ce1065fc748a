use super::{DetectionInput, IssueDetector, config_strings};
use crate::issue::{Issue, IssueCategory};
use crate::performance::{configured_delay, format_seconds};
use crate::vocabulary::ActionKind;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

const MAX_WAIT_SECONDS: f64 = 7.0 * 86_400.0;
/// Workflows with at least this many actions should say what they are for.
const DESCRIPTION_REQUIRED_FROM: usize = 5;

/// Head identifier of a `{{ ... }}` template expression.
static TEMPLATE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)").expect("template pattern is valid")
});

pub struct ExcessiveWaitDetector;

impl IssueDetector for ExcessiveWaitDetector {
    fn id(&self) -> &str {
        "excessive_wait"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::ExcessiveWait
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action) == ActionKind::Delay)
            .filter_map(|action| {
                let delay = configured_delay(&action.config);
                (delay > MAX_WAIT_SECONDS).then(|| {
                    input.issue(
                        IssueCategory::ExcessiveWait,
                        vec![action.id.clone()],
                        format!(
                            "Wait step '{}' holds contacts for {}",
                            action.display_name(),
                            format_seconds(delay)
                        ),
                        "Shorten the wait to a week or less, or move the follow-up into a separate workflow.",
                    )
                })
            })
            .collect()
    }
}

/// Two or more actions of the same kind with identical configuration.
pub struct DuplicateActionDetector;

impl IssueDetector for DuplicateActionDetector {
    fn id(&self) -> &str {
        "duplicate_action"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DuplicateAction
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let mut seen_ids: AHashSet<&str> = AHashSet::new();
        let mut group_of: AHashMap<(ActionKind, String), usize> = AHashMap::new();
        let mut groups: Vec<Vec<&str>> = Vec::new();

        for action in &input.workflow.actions {
            if action.config.is_empty() || !seen_ids.insert(action.id.as_str()) {
                continue;
            }
            let key = (
                input.kind_of(action),
                serde_json::Value::Object(action.config.clone()).to_string(),
            );
            match group_of.get(&key) {
                Some(&g) => groups[g].push(action.id.as_str()),
                None => {
                    group_of.insert(key, groups.len());
                    groups.push(vec![action.id.as_str()]);
                }
            }
        }

        groups
            .into_iter()
            .filter(|ids| ids.len() > 1)
            .map(|ids| {
                input.issue(
                    IssueCategory::DuplicateAction,
                    ids.iter().map(|id| id.to_string()).collect(),
                    format!(
                        "Actions {} are configured identically",
                        ids.iter().map(|id| format!("'{}'", id)).join(", ")
                    ),
                    "Remove the duplicates or make the intended difference explicit.",
                )
            })
            .collect()
    }
}

/// Workflow variables never referenced by any action.
pub struct UnusedVariableDetector;

impl IssueDetector for UnusedVariableDetector {
    fn id(&self) -> &str {
        "unused_variable"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::UnusedVariable
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let referenced: AHashSet<&str> = input
            .workflow
            .actions
            .iter()
            .flat_map(|action| config_strings(&action.config))
            .flat_map(|text| TEMPLATE_REFERENCE.captures_iter(text))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        input
            .workflow
            .variables
            .iter()
            .filter(|name| !name.trim().is_empty())
            .unique()
            .filter(|name| !referenced.contains(name.as_str()))
            .map(|name| {
                input.issue(
                    IssueCategory::UnusedVariable,
                    vec![],
                    format!("Variable '{}' is declared but never used", name),
                    "Delete the variable or reference it where it was meant to be used.",
                )
            })
            .collect()
    }
}

pub struct MissingDescriptionDetector;

impl IssueDetector for MissingDescriptionDetector {
    fn id(&self) -> &str {
        "missing_description"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::MissingDescription
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let workflow = input.workflow;
        let described = workflow
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if described || workflow.actions.len() < DESCRIPTION_REQUIRED_FROM {
            return vec![];
        }
        vec![input.issue(
            IssueCategory::MissingDescription,
            vec![],
            format!(
                "Workflow '{}' has {} actions but no description",
                workflow.name,
                workflow.actions.len()
            ),
            "Describe the workflow's goal and audience so others can maintain it.",
        )]
    }
}

pub struct DeprecatedActionDetector;

impl IssueDetector for DeprecatedActionDetector {
    fn id(&self) -> &str {
        "deprecated_action"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::DeprecatedAction
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action) == ActionKind::Deprecated)
            .map(|action| {
                input.issue(
                    IssueCategory::DeprecatedAction,
                    vec![action.id.clone()],
                    format!(
                        "Action '{}' uses the deprecated '{}' step",
                        action.display_name(),
                        action.action_type
                    ),
                    "Replace it with the current equivalent before the vendor removes it.",
                )
            })
            .collect()
    }
}

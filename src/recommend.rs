use crate::issue::{Issue, Severity};
use crate::workflow::WorkflowMetadata;

/// Title keywords and the advice they trigger, in output order.
const CATEGORY_ADVICE: &[(&[&str], &str)] = &[
    (
        &["error handling"],
        "Add error handling to every external API call and webhook",
    ),
    (
        &["rate limit", "throttl"],
        "Throttle bulk sends to stay under provider rate limits",
    ),
    (
        &["validat"],
        "Validate contact fields before using them in messages",
    ),
    (&["timeout"], "Configure timeouts on all outbound requests"),
];

/// Turns the issue list into a short, ordered list of next actions.
///
/// The order is fixed: severity counts (most urgent first), category advice,
/// then context lines about activity and audience size.
pub fn synthesize_recommendations(
    issues: &[Issue],
    workflow: &WorkflowMetadata,
    high_volume_contacts: u64,
) -> Vec<String> {
    let mut lines = Vec::new();

    for severity in Severity::ALL {
        let count = issues.iter().filter(|i| i.severity == severity).count();
        if count == 0 {
            continue;
        }
        lines.push(match severity {
            Severity::Critical => format!(
                "Fix {} critical issue{} immediately; they can break the workflow for every contact",
                count,
                plural(count)
            ),
            Severity::High => format!(
                "Address {} high-priority issue{} to improve reliability",
                count,
                plural(count)
            ),
            Severity::Medium => format!(
                "Review {} medium-priority issue{} when possible",
                count,
                plural(count)
            ),
            Severity::Low => format!(
                "Consider {} low-priority improvement{} for long-term maintainability",
                count,
                plural(count)
            ),
        });
    }

    let titles: Vec<String> = issues.iter().map(|i| i.title.to_lowercase()).collect();
    for (keywords, advice) in CATEGORY_ADVICE {
        if titles
            .iter()
            .any(|title| keywords.iter().any(|k| title.contains(k)))
        {
            lines.push(advice.to_string());
        }
    }

    if workflow.is_active() {
        lines.push(
            "This workflow is live; test fixes on a copy before publishing them".to_string(),
        );
    }
    if workflow.contact_count >= high_volume_contacts {
        lines.push(format!(
            "{} contacts flow through this workflow; roll changes out to a small segment first",
            workflow.contact_count
        ));
    }

    lines
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueCategory;

    fn issue(category: IssueCategory) -> Issue {
        Issue {
            severity: category.default_severity(),
            category,
            title: category.title().to_string(),
            description: String::new(),
            node_ids: vec![],
            fix: String::new(),
            penalty: category.default_penalty(),
        }
    }

    #[test]
    fn test_empty_input_gives_no_lines() {
        let workflow = WorkflowMetadata::new("wf", "wf");
        assert!(synthesize_recommendations(&[], &workflow, 1000).is_empty());
    }

    #[test]
    fn test_fixed_order() {
        let workflow = WorkflowMetadata::new("wf", "wf")
            .with_status("active")
            .with_contact_count(2500);
        let issues = vec![
            issue(IssueCategory::MissingTimeout),
            issue(IssueCategory::MissingRequiredField),
            issue(IssueCategory::MissingErrorHandling),
            issue(IssueCategory::MissingThrottling),
            issue(IssueCategory::UnvalidatedContactField),
        ];
        let lines = synthesize_recommendations(&issues, &workflow, 1000);
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("Fix 1 critical issue "));
        assert!(lines[1].starts_with("Address 3 high-priority issues"));
        assert!(lines[2].starts_with("Review 1 medium-priority issue "));
        assert!(lines[3].contains("error handling"));
        assert!(lines[4].contains("rate limits"));
        assert!(lines[5].contains("Validate"));
        assert!(lines[6].contains("timeouts"));
        assert!(lines[7].contains("live"));
        assert!(lines[8].starts_with("2500 contacts"));
    }
}

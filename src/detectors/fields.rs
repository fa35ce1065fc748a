use super::{DetectionInput, IssueDetector, config_strings, has_any_key};
use crate::issue::{Issue, IssueCategory};
use crate::vocabulary::ActionKind;
use crate::workflow::ActionRecord;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

const EMAIL_RECIPIENT_KEYS: &[&str] = &["to", "recipient", "recipients", "email", "toEmail"];
const SMS_RECIPIENT_KEYS: &[&str] = &["to", "phone", "recipient", "phoneNumber"];
const ENDPOINT_KEYS: &[&str] = &["url", "endpoint"];
const VALIDATION_KEYS: &[&str] = &[
    "fallback",
    "fallbackValues",
    "defaultValues",
    "validateFields",
    "validation",
];

/// `{{contact.field}}`, optionally followed by a `| default` filter.
static CONTACT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*contact\.([A-Za-z0-9_]+)\s*(\|[^}]*)?\}\}").expect("contact pattern is valid")
});

/// Fields an action cannot run without.
pub struct MissingRequiredFieldDetector;

impl MissingRequiredFieldDetector {
    fn required_fields(kind: ActionKind) -> Option<(&'static str, &'static [&'static str])> {
        if kind.is_email() {
            Some(("recipient", EMAIL_RECIPIENT_KEYS))
        } else if kind.is_sms() {
            Some(("phone number", SMS_RECIPIENT_KEYS))
        } else if kind.is_http() {
            Some(("endpoint URL", ENDPOINT_KEYS))
        } else {
            None
        }
    }
}

impl IssueDetector for MissingRequiredFieldDetector {
    fn id(&self) -> &str {
        "missing_required_field"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::MissingRequiredField
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        input
            .workflow
            .actions
            .iter()
            .filter_map(|action| {
                let (field, keys) = Self::required_fields(input.kind_of(action))?;
                if has_any_key(&action.config, keys) {
                    return None;
                }
                Some(input.issue(
                    IssueCategory::MissingRequiredField,
                    vec![action.id.clone()],
                    format!(
                        "Action '{}' ({}) has no {} configured",
                        action.display_name(),
                        action.action_type,
                        field
                    ),
                    "Fill in the missing field; the action fails for every contact until it is set.",
                ))
            })
            .collect()
    }
}

/// Contact fields interpolated into a message without a default filter.
pub fn unvalidated_contact_fields(action: &ActionRecord) -> Vec<String> {
    config_strings(&action.config)
        .into_iter()
        .flat_map(|text| CONTACT_FIELD.captures_iter(text))
        .filter(|caps| caps.get(2).is_none())
        .map(|caps| caps[1].to_string())
        .unique()
        .collect()
}

/// Messages that interpolate contact data with no presence or format check.
pub struct UnvalidatedContactFieldDetector;

impl IssueDetector for UnvalidatedContactFieldDetector {
    fn id(&self) -> &str {
        "unvalidated_contact_field"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::UnvalidatedContactField
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action).is_messaging())
            .filter(|action| !has_any_key(&action.config, VALIDATION_KEYS))
            .filter_map(|action| {
                let fields = unvalidated_contact_fields(action);
                if fields.is_empty() {
                    return None;
                }
                Some(input.issue(
                    IssueCategory::UnvalidatedContactField,
                    vec![action.id.clone()],
                    format!(
                        "Action '{}' inserts contact field(s) {} without checking they exist",
                        action.display_name(),
                        fields.iter().map(|f| format!("'{}'", f)).join(", ")
                    ),
                    "Add a default (e.g. {{contact.first_name | default: \"there\"}}) or a condition that checks the field first.",
                ))
            })
            .collect()
    }
}

use super::{DetectionInput, IssueDetector, first_set, has_any_key};
use crate::issue::{Issue, IssueCategory};
use crate::vocabulary::ActionKind;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

const ENDPOINT_KEYS: &[&str] = &["url", "endpoint"];
const TIMEOUT_KEYS: &[&str] = &["timeout", "timeoutMs", "timeoutSeconds"];
const ERROR_HANDLING_KEYS: &[&str] = &[
    "onError",
    "errorHandler",
    "errorBranch",
    "fallback",
    "continueOnError",
    "retry",
    "retries",
];
/// Edge labels that mark an error path out of an external call.
const ERROR_EDGE_MARKERS: &[&str] = &["error", "fail", "fallback"];

/// Defines detectors of the form "actions of some kind that lack every one of a set of config keys".
macro_rules! define_missing_config_detectors {
    ( $( ($name:ident, $id:expr, $category:path, $applies:expr, $keys:expr, $describe:literal, $fix:expr) ),* $(,)? ) => {
        $(
            pub struct $name;

            impl IssueDetector for $name {
                fn id(&self) -> &str { $id }

                fn category(&self) -> IssueCategory { $category }

                fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
                    let applies: fn(ActionKind) -> bool = $applies;
                    input
                        .workflow
                        .actions
                        .iter()
                        .filter(|action| applies(input.kind_of(action)))
                        .filter(|action| !has_any_key(&action.config, $keys))
                        .map(|action| {
                            input.issue(
                                $category,
                                vec![action.id.clone()],
                                format!($describe, action.display_name()),
                                $fix,
                            )
                        })
                        .collect()
                }
            }
        )*
    };
}

define_missing_config_detectors! {
    (
        PaymentRetryDetector,
        "payment_without_retry",
        IssueCategory::PaymentWithoutRetry,
        |kind| kind == ActionKind::Payment,
        &["retry", "retries", "maxRetries", "retryPolicy", "retryCount"],
        "Payment action '{}' has no retry configuration; a transient processor error loses the charge",
        "Configure retries with backoff on the payment step."
    ),
    (
        MissingThrottlingDetector,
        "missing_throttling",
        IssueCategory::MissingThrottling,
        ActionKind::is_bulk,
        &["throttle", "throttling", "rateLimit", "batchSize", "sendRate"],
        "Bulk action '{}' sends without throttling and can hit provider rate limits",
        "Set a batch size or send rate on the bulk step."
    ),
}

/// True when the URL's host can never be reached from the public internet.
pub fn is_unreachable_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }
    let parsed = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("http://{}", raw))
    };
    let Ok(url) = parsed else {
        return false;
    };

    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost"
                || domain.ends_with(".localhost")
                || domain.ends_with(".local")
                || domain.ends_with(".internal")
        }
        Some(Host::Ipv4(ip)) => is_private_v4(ip),
        Some(Host::Ipv6(ip)) => is_private_v6(ip),
        None => false,
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}

/// Webhooks and HTTP steps pointed at loopback or private hosts.
pub struct UnreachableEndpointDetector;

impl IssueDetector for UnreachableEndpointDetector {
    fn id(&self) -> &str {
        "unreachable_endpoint"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::UnreachableEndpoint
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let from_webhooks = input
            .workflow
            .webhooks
            .iter()
            .map(|hook| (hook.id.as_str(), hook.url.as_str()));

        let from_actions = input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action).is_external_call())
            .filter_map(|action| {
                first_set(&action.config, ENDPOINT_KEYS)
                    .and_then(|v| v.as_str())
                    .map(|url| (action.id.as_str(), url))
            });

        from_webhooks
            .chain(from_actions)
            .filter(|(_, url)| is_unreachable_url(url))
            .map(|(id, url)| {
                input.issue(
                    IssueCategory::UnreachableEndpoint,
                    vec![id.to_string()],
                    format!(
                        "Endpoint '{}' points at a local or private network address the CRM cannot reach",
                        url
                    ),
                    "Use a publicly reachable HTTPS endpoint.",
                )
            })
            .collect()
    }
}

/// External calls with neither an error handler in config nor an error edge in the graph.
pub struct MissingErrorHandlingDetector;

impl IssueDetector for MissingErrorHandlingDetector {
    fn id(&self) -> &str {
        "missing_error_handling"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::MissingErrorHandling
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action).is_external_call())
            .filter(|action| !has_any_key(&action.config, ERROR_HANDLING_KEYS))
            .filter(|action| {
                !input.graph.outgoing_edges(&action.id).any(|edge| {
                    edge.condition_label.as_deref().is_some_and(|label| {
                        let label = label.to_ascii_lowercase();
                        ERROR_EDGE_MARKERS.iter().any(|m| label.contains(m))
                    })
                })
            })
            .map(|action| {
                input.issue(
                    IssueCategory::MissingErrorHandling,
                    vec![action.id.clone()],
                    format!(
                        "External call '{}' has no error branch or fallback; a failed request stops the contact",
                        action.display_name()
                    ),
                    "Add an error branch or a fallback step after the call.",
                )
            })
            .collect()
    }
}

/// HTTP steps and webhooks that can hang indefinitely.
pub struct MissingTimeoutDetector;

impl IssueDetector for MissingTimeoutDetector {
    fn id(&self) -> &str {
        "missing_timeout"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::MissingTimeout
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Vec<Issue> {
        let fix = "Set an explicit timeout (10-30 seconds is typical).";

        let http_steps: Vec<_> = input
            .workflow
            .actions
            .iter()
            .filter(|action| input.kind_of(action).is_http())
            .collect();

        let actions = http_steps
            .iter()
            .filter(|action| !has_any_key(&action.config, TIMEOUT_KEYS))
            .map(|action| {
                input.issue(
                    IssueCategory::MissingTimeout,
                    vec![action.id.clone()],
                    format!("HTTP step '{}' has no timeout", action.display_name()),
                    fix,
                )
            });

        let webhooks = input
            .workflow
            .webhooks
            .iter()
            // A webhook that is also an HTTP step is judged by the step's config.
            .filter(|hook| !http_steps.iter().any(|action| action.id == hook.id))
            .filter(|hook| !has_any_key(&hook.config, TIMEOUT_KEYS))
            .map(|hook| {
                input.issue(
                    IssueCategory::MissingTimeout,
                    vec![hook.id.clone()],
                    format!("Webhook '{}' has no timeout", hook.id),
                    fix,
                )
            });

        actions.chain(webhooks).collect()
    }
}

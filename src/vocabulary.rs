//! Internal action vocabulary.
//!
//! CRM exports name their actions in whatever style the vendor prefers
//! (`SendEmail`, `send_email`, `send-email`). Every tag is first normalized to
//! lowercase alphanumerics and then looked up in a fixed table. Callers can
//! register extra aliases for vendor-specific names through
//! [`Vocabulary::with_alias`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The internal classification of an action or trigger type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Email,
    Sms,
    BulkEmail,
    BulkSms,
    Webhook,
    HttpRequest,
    Api,
    Payment,
    Delay,
    Condition,
    ContactUpdate,
    Tag,
    Task,
    Deprecated,
    Unknown,
}

impl ActionKind {
    /// Webhooks, raw HTTP requests and third-party API integrations.
    pub fn is_external_call(self) -> bool {
        matches!(self, Self::Webhook | Self::HttpRequest | Self::Api)
    }

    pub fn is_http(self) -> bool {
        matches!(self, Self::Webhook | Self::HttpRequest)
    }

    pub fn is_bulk(self) -> bool {
        matches!(self, Self::BulkEmail | Self::BulkSms)
    }

    pub fn is_email(self) -> bool {
        matches!(self, Self::Email | Self::BulkEmail)
    }

    pub fn is_sms(self) -> bool {
        matches!(self, Self::Sms | Self::BulkSms)
    }

    /// Any action that delivers a message to a contact.
    pub fn is_messaging(self) -> bool {
        self.is_email() || self.is_sms()
    }
}

/// Lowercases a tag and strips every non-alphanumeric character.
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps an already-normalized tag onto the fixed vocabulary.
fn builtin_kind(normalized: &str) -> ActionKind {
    match normalized {
        "email" | "sendemail" | "emailaction" => ActionKind::Email,
        "sms" | "sendsms" | "textmessage" | "sendtext" => ActionKind::Sms,
        "bulkemail" | "sendbulkemail" | "emailblast" | "massemail" => ActionKind::BulkEmail,
        "bulksms" | "sendbulksms" | "smsblast" | "masssms" => ActionKind::BulkSms,
        "webhook" | "sendwebhook" | "customwebhook" => ActionKind::Webhook,
        "http" | "httprequest" | "httpcall" | "request" => ActionKind::HttpRequest,
        "api" | "apicall" | "integration" | "externalapi" => ActionKind::Api,
        "payment" | "charge" | "stripecharge" | "createpayment" | "processpayment" => {
            ActionKind::Payment
        }
        "delay" | "wait" | "waitdelay" | "timedelay" | "sleep" => ActionKind::Delay,
        "condition" | "ifelse" | "branch" | "split" | "decision" | "filter" => {
            ActionKind::Condition
        }
        "updatecontact" | "createcontact" | "setfield" | "updatefield" => {
            ActionKind::ContactUpdate
        }
        "addtag" | "removetag" | "tag" => ActionKind::Tag,
        "createtask" | "task" | "notify" | "internalnotification" => ActionKind::Task,
        "legacyemail" | "sendfax" | "oldwebhook" | "v1webhook" | "legacysms" => {
            ActionKind::Deprecated
        }
        _ => ActionKind::Unknown,
    }
}

/// The tag-to-kind lookup used by detectors and the performance estimator.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    aliases: AHashMap<String, ActionKind>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vendor tag as a synonym for one of the internal tags.
    ///
    /// Unknown internal tags are ignored, so a typo never shadows the builtin table.
    pub fn with_alias(mut self, vendor_tag: &str, internal_tag: &str) -> Self {
        self.insert_alias(vendor_tag, internal_tag);
        self
    }

    pub fn insert_alias(&mut self, vendor_tag: &str, internal_tag: &str) {
        let kind = builtin_kind(&normalize_tag(internal_tag));
        if kind != ActionKind::Unknown {
            self.aliases.insert(normalize_tag(vendor_tag), kind);
        }
    }

    pub fn kind_of(&self, tag: &str) -> ActionKind {
        let normalized = normalize_tag(tag);
        self.aliases
            .get(&normalized)
            .copied()
            .unwrap_or_else(|| builtin_kind(&normalized))
    }

    pub fn is_recognized(&self, tag: &str) -> bool {
        self.kind_of(tag) != ActionKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag_styles() {
        assert_eq!(normalize_tag("SendEmail"), "sendemail");
        assert_eq!(normalize_tag("send_email"), "sendemail");
        assert_eq!(normalize_tag("send-email"), "sendemail");
        assert_eq!(normalize_tag("  HTTP Request "), "httprequest");
    }

    #[test]
    fn test_builtin_lookup() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.kind_of("SendEmail"), ActionKind::Email);
        assert_eq!(vocab.kind_of("bulk_sms"), ActionKind::BulkSms);
        assert_eq!(vocab.kind_of("HttpRequest"), ActionKind::HttpRequest);
        assert_eq!(vocab.kind_of("Wait"), ActionKind::Delay);
        assert_eq!(vocab.kind_of("MysteryStep"), ActionKind::Unknown);
    }

    #[test]
    fn test_alias_overrides_and_ignores_unknown_targets() {
        let vocab = Vocabulary::new()
            .with_alias("HubspotEmailBlast", "bulk_email")
            .with_alias("Oddity", "not-a-real-tag");
        assert_eq!(vocab.kind_of("hubspot_email_blast"), ActionKind::BulkEmail);
        assert_eq!(vocab.kind_of("Oddity"), ActionKind::Unknown);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ActionKind::Webhook.is_external_call());
        assert!(ActionKind::Api.is_external_call());
        assert!(!ActionKind::Api.is_http());
        assert!(ActionKind::BulkEmail.is_messaging());
        assert!(!ActionKind::Payment.is_messaging());
    }
}

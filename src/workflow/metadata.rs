use crate::graph::config_lookup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle state of a workflow in the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Active,
    #[default]
    Draft,
    Paused,
    Inactive,
    Other(String),
}

impl WorkflowStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, WorkflowStatus::Active)
    }
}

impl From<String> for WorkflowStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" | "published" | "live" => WorkflowStatus::Active,
            "draft" => WorkflowStatus::Draft,
            "paused" => WorkflowStatus::Paused,
            "inactive" | "disabled" | "archived" => WorkflowStatus::Inactive,
            _ => WorkflowStatus::Other(raw),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(raw: &str) -> Self {
        WorkflowStatus::from(raw.to_string())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::Active => write!(f, "active"),
            WorkflowStatus::Draft => write!(f, "draft"),
            WorkflowStatus::Paused => write!(f, "paused"),
            WorkflowStatus::Inactive => write!(f, "inactive"),
            WorkflowStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// An action exactly as the CRM configured it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: String,
    #[serde(rename = "type", alias = "actionType")]
    pub action_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ActionRecord {
    pub fn new(id: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_type: action_type.into(),
            name: String::new(),
            config: Map::new(),
        }
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Case-insensitive config lookup.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        config_lookup(&self.config, key)
    }

    /// Name for messages: the configured name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A webhook subscription registered on the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// The narrow slice of the raw workflow the detectors and scoring consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WorkflowPayload")]
pub struct WorkflowMetadata {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkflowStatus,
    pub contact_count: u64,
    pub actions: Vec<ActionRecord>,
    pub webhooks: Vec<WebhookRecord>,
    pub branch_count: usize,
    pub external_dependency_count: usize,
    /// Workflow-level variables that actions may reference as `{{name}}`.
    pub variables: Vec<String>,
}

impl WorkflowMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<WorkflowStatus>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_contact_count(mut self, contact_count: u64) -> Self {
        self.contact_count = contact_count;
        self
    }

    pub fn with_actions(mut self, actions: Vec<ActionRecord>) -> Self {
        self.actions = actions;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Wire shape accepted for `WorkflowMetadata`. Contact volume may arrive either
/// as an estimate or as the contact list itself; the estimate wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowPayload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: WorkflowStatus,
    #[serde(default, alias = "contactCount")]
    estimated_contacts: Option<u64>,
    #[serde(default)]
    contacts: Vec<Value>,
    #[serde(default)]
    actions: Vec<ActionRecord>,
    #[serde(default)]
    webhooks: Vec<WebhookRecord>,
    #[serde(default, alias = "branches")]
    branch_count: CountOrList,
    #[serde(default, alias = "externalDependencies")]
    external_dependency_count: CountOrList,
    #[serde(default)]
    variables: Vec<String>,
}

/// Either a plain count or a list whose length is the count.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum CountOrList {
    #[default]
    Missing,
    Count(usize),
    List(Vec<Value>),
}

impl CountOrList {
    fn count(self) -> usize {
        match self {
            CountOrList::Missing => 0,
            CountOrList::Count(n) => n,
            CountOrList::List(items) => items.len(),
        }
    }
}

impl From<WorkflowPayload> for WorkflowMetadata {
    fn from(payload: WorkflowPayload) -> Self {
        WorkflowMetadata {
            id: payload.id,
            name: payload.name,
            description: payload.description,
            status: payload.status,
            contact_count: payload
                .estimated_contacts
                .unwrap_or(payload.contacts.len() as u64),
            actions: payload.actions,
            webhooks: payload.webhooks,
            branch_count: payload.branch_count.count(),
            external_dependency_count: payload.external_dependency_count.count(),
            variables: payload.variables,
        }
    }
}

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How urgently an issue needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most urgent first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        write!(f, "{}", name)
    }
}

/// The fixed set of problems the detectors look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    MissingRequiredField,
    UnreachableEndpoint,
    PaymentWithoutRetry,
    InfiniteLoop,
    TriggerConflict,
    MissingErrorHandling,
    MissingTimeout,
    MissingThrottling,
    UnvalidatedContactField,
    DeadBranch,
    ExcessiveWait,
    HighComplexity,
    DuplicateAction,
    UnusedVariable,
    MissingDescription,
    DeprecatedAction,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 16] = [
        IssueCategory::MissingRequiredField,
        IssueCategory::UnreachableEndpoint,
        IssueCategory::PaymentWithoutRetry,
        IssueCategory::InfiniteLoop,
        IssueCategory::TriggerConflict,
        IssueCategory::MissingErrorHandling,
        IssueCategory::MissingTimeout,
        IssueCategory::MissingThrottling,
        IssueCategory::UnvalidatedContactField,
        IssueCategory::DeadBranch,
        IssueCategory::ExcessiveWait,
        IssueCategory::HighComplexity,
        IssueCategory::DuplicateAction,
        IssueCategory::UnusedVariable,
        IssueCategory::MissingDescription,
        IssueCategory::DeprecatedAction,
    ];

    pub fn default_severity(self) -> Severity {
        use IssueCategory::*;
        match self {
            MissingRequiredField | UnreachableEndpoint | PaymentWithoutRetry | InfiniteLoop => {
                Severity::Critical
            }
            TriggerConflict | MissingErrorHandling | MissingTimeout | MissingThrottling => {
                Severity::High
            }
            UnvalidatedContactField | DeadBranch | ExcessiveWait | HighComplexity => {
                Severity::Medium
            }
            DuplicateAction | UnusedVariable | MissingDescription | DeprecatedAction => {
                Severity::Low
            }
        }
    }

    pub fn default_penalty(self) -> f64 {
        use IssueCategory::*;
        match self {
            MissingRequiredField => 30.0,
            UnreachableEndpoint => 30.0,
            PaymentWithoutRetry => 35.0,
            InfiniteLoop => 40.0,
            TriggerConflict => 25.0,
            MissingErrorHandling => 20.0,
            MissingTimeout => 15.0,
            MissingThrottling => 15.0,
            UnvalidatedContactField => 15.0,
            DeadBranch => 10.0,
            ExcessiveWait => 12.0,
            HighComplexity => 10.0,
            DuplicateAction => 5.0,
            UnusedVariable => 3.0,
            MissingDescription => 3.0,
            DeprecatedAction => 8.0,
        }
    }

    pub fn title(self) -> &'static str {
        use IssueCategory::*;
        match self {
            MissingRequiredField => "Missing required field",
            UnreachableEndpoint => "Unreachable external endpoint",
            PaymentWithoutRetry => "Payment without retry",
            InfiniteLoop => "Infinite loop",
            TriggerConflict => "Trigger conflict",
            MissingErrorHandling => "External call without error handling",
            MissingTimeout => "External call without timeout",
            MissingThrottling => "Bulk operation without throttling",
            UnvalidatedContactField => "Unvalidated contact field",
            DeadBranch => "Dead branch",
            ExcessiveWait => "Excessive wait",
            HighComplexity => "High structural complexity",
            DuplicateAction => "Duplicate action",
            UnusedVariable => "Unused variable",
            MissingDescription => "Missing description",
            DeprecatedAction => "Deprecated action",
        }
    }
}

/// A single finding reported by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub title: String,
    pub description: String,
    pub node_ids: Vec<String>,
    pub fix: String,
    /// Raw deduction, before the severity multiplier is applied.
    pub penalty: f64,
}

/// Raw penalty per category. Swappable as a whole for tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<IssueCategory, f64>",
    into = "BTreeMap<IssueCategory, f64>"
)]
pub struct PenaltyTable {
    penalties: AHashMap<IssueCategory, f64>,
}

impl Default for PenaltyTable {
    fn default() -> Self {
        let penalties = IssueCategory::ALL
            .iter()
            .map(|c| (*c, c.default_penalty()))
            .collect();
        Self { penalties }
    }
}

impl PenaltyTable {
    pub fn get(&self, category: IssueCategory) -> f64 {
        self.penalties
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_penalty())
    }

    /// Overrides one entry. Negative or non-finite values are ignored.
    pub fn with_penalty(mut self, category: IssueCategory, penalty: f64) -> Self {
        if penalty.is_finite() && penalty >= 0.0 {
            self.penalties.insert(category, penalty);
        }
        self
    }
}

impl TryFrom<BTreeMap<IssueCategory, f64>> for PenaltyTable {
    type Error = String;

    fn try_from(overrides: BTreeMap<IssueCategory, f64>) -> Result<Self, Self::Error> {
        let mut table = PenaltyTable::default();
        for (category, penalty) in overrides {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(format!(
                    "penalty for '{}' must be a non-negative number, got {}",
                    category.title(),
                    penalty
                ));
            }
            table.penalties.insert(category, penalty);
        }
        Ok(table)
    }
}

impl From<PenaltyTable> for BTreeMap<IssueCategory, f64> {
    fn from(table: PenaltyTable) -> Self {
        table.penalties.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_policy() {
        let table = PenaltyTable::default();
        assert_eq!(table.get(IssueCategory::InfiniteLoop), 40.0);
        assert_eq!(table.get(IssueCategory::PaymentWithoutRetry), 35.0);
        assert_eq!(table.get(IssueCategory::ExcessiveWait), 12.0);
        for category in IssueCategory::ALL {
            let p = table.get(category);
            assert!((0.0..=40.0).contains(&p));
        }
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let table: PenaltyTable = serde_json::from_str(r#"{"dead_branch": 2.5}"#).unwrap();
        assert_eq!(table.get(IssueCategory::DeadBranch), 2.5);
        assert_eq!(table.get(IssueCategory::InfiniteLoop), 40.0);
    }

    #[test]
    fn test_negative_override_rejected() {
        let result: Result<PenaltyTable, _> = serde_json::from_str(r#"{"dead_branch": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result: Result<PenaltyTable, _> = serde_json::from_str(r#"{"made_up": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_low_severity_penalties_in_band() {
        for category in IssueCategory::ALL {
            if category.default_severity() == Severity::Low {
                let p = category.default_penalty();
                assert!((3.0..=8.0).contains(&p), "{:?} has {}", category, p);
            }
        }
    }
}

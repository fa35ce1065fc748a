use crate::error::ConfigError;
use crate::graph::DEFAULT_CYCLE_LIMIT;
use crate::issue::PenaltyTable;
use crate::scoring::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Tuning for an `Analyzer`, loadable from a JSON file.
///
/// Every field is optional in the file; missing ones keep their defaults.
///
/// ```json
/// {
///   "penalties": { "infinite_loop": 50, "dead_branch": 5 },
///   "weights": { "highVolumeContacts": 5000, "activeFactor": 1.2 },
///   "typeAliases": { "fireWebhook": "webhook" },
///   "cycleLimit": 128
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub penalties: PenaltyTable,
    pub weights: ScoringWeights,
    /// Vendor tag -> internal tag.
    pub type_aliases: BTreeMap<String, String>,
    pub cycle_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            penalties: PenaltyTable::default(),
            weights: ScoringWeights::default(),
            type_aliases: BTreeMap::new(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
        }
    }
}

impl AnalyzerConfig {
    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded analyzer config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate().map_err(ConfigError::InvalidValue)?;
        if self.cycle_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "cycleLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

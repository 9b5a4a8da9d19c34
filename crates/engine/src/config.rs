use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Threshold for automatic assignment and bulk reconciliation.
pub const AUTO_THRESHOLD: f64 = 0.7;
/// Threshold for manual-assist candidate lists.
pub const MATCH_THRESHOLD: f64 = 0.5;
/// Floor for suggestions.
pub const SUGGESTION_THRESHOLD: f64 = 0.3;
pub const SUGGESTION_LIMIT: usize = 5;
/// Receipt ids reported for an ambiguous transaction.
pub const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub auto_threshold: f64,
    pub match_threshold: f64,
    pub suggestion_threshold: f64,
    pub suggestion_limit: usize,
    pub candidate_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            auto_threshold: AUTO_THRESHOLD,
            match_threshold: MATCH_THRESHOLD,
            suggestion_threshold: SUGGESTION_THRESHOLD,
            suggestion_limit: SUGGESTION_LIMIT,
            candidate_limit: CANDIDATE_LIMIT,
        }
    }
}

impl MatchConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("auto_threshold", self.auto_threshold),
            ("match_threshold", self.match_threshold),
            ("suggestion_threshold", self.suggestion_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.suggestion_limit == 0 {
            return Err(ConfigError::InvalidLimit { name: "suggestion_limit" });
        }
        if self.candidate_limit == 0 {
            return Err(ConfigError::InvalidLimit { name: "candidate_limit" });
        }
        Ok(())
    }
}

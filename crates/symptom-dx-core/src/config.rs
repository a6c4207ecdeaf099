//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnosis::{RankingPolicy, DEFAULT_NORMALIZE_THRESHOLD};
use crate::models::Score;

pub const APP_NAME: &str = "symptom-dx";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "symptom_dx_core=info,symptom_dx_llm=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which extraction strategy the engine uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Split on separators and normalize each segment
    #[default]
    TokenSplit,
    /// Scan for vocabulary phrases (entity path, no fuzzy normalization)
    Keywords,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum extracted symptoms before ranking
    pub min_symptoms: usize,
    /// Candidates returned by a ranking
    pub top_k: usize,
    /// +15 for diseases with at least three good matches
    pub strong_match_boost: bool,
    /// Partial-ratio score needed to map a phrase onto the vocabulary
    pub normalize_threshold: Score,
    /// Token-sort score counted as a good match
    pub good_match_threshold: Score,
    pub extraction: ExtractionMode,
    /// Extra synonyms merged over the built-in table
    pub synonyms: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = RankingPolicy::default();
        Self {
            min_symptoms: policy.min_required,
            top_k: policy.top_k,
            strong_match_boost: policy.strong_match_boost,
            normalize_threshold: DEFAULT_NORMALIZE_THRESHOLD,
            good_match_threshold: policy.good_match_threshold,
            extraction: ExtractionMode::default(),
            synonyms: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Ranking parameters carried by this config.
    pub fn policy(&self) -> RankingPolicy {
        RankingPolicy {
            min_required: self.min_symptoms,
            top_k: self.top_k,
            good_match_threshold: self.good_match_threshold,
            strong_match_boost: self.strong_match_boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.min_symptoms, 2);
        assert_eq!(config.top_k, 3);
        assert!(!config.strong_match_boost);
        assert_eq!(config.normalize_threshold, 75);
        assert_eq!(config.good_match_threshold, 70);
        assert_eq!(config.extraction, ExtractionMode::TokenSplit);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json_str(
            r#"{"min_symptoms": 3, "strong_match_boost": true, "extraction": "keywords",
                "synonyms": {"feeling hot": "fever"}}"#,
        )
        .unwrap();

        let policy = config.policy();
        assert_eq!(policy.min_required, 3);
        assert_eq!(policy.top_k, 3);
        assert!(policy.strong_match_boost);
        assert_eq!(config.extraction, ExtractionMode::Keywords);
        assert_eq!(config.synonyms.get("feeling hot").map(String::as_str), Some("fever"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"top_k": "three"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"top_k": 4}"#).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap().top_k, 4);
    }
}

//! Diagnosis engine for free-text symptom descriptions.
//!
//! Pipeline: Extraction → Normalization → Ranking

mod extractor;
mod normalizer;
mod ranker;
pub mod similarity;

pub use extractor::*;
pub use normalizer::*;
pub use ranker::*;

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::{EngineConfig, ExtractionMode};
use crate::models::{RankedResult, RemedyInfo};

/// Diagnosis errors. Both are recoverable and surface as user-facing prompts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosisError {
    #[error("Please provide at least {required} symptoms (found {found})")]
    InsufficientSymptoms { found: usize, required: usize },

    #[error("Disease not found: {0}")]
    UnknownDisease(String),
}

pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

/// Read-only engine that owns the catalog and coordinates the pipeline.
pub struct DiagnosisEngine {
    catalog: Catalog,
    normalizer: SymptomNormalizer,
    strategy: ExtractionStrategy,
    policy: RankingPolicy,
}

impl DiagnosisEngine {
    /// Create an engine with the built-in synonyms, token split and default policy.
    pub fn new(catalog: Catalog) -> Self {
        let normalizer = SymptomNormalizer::new(catalog.vocabulary().clone());
        Self {
            catalog,
            normalizer,
            strategy: ExtractionStrategy::TokenSplit,
            policy: RankingPolicy::default(),
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(catalog: Catalog, config: &EngineConfig) -> Self {
        let mut synonyms = SynonymTable::new();
        synonyms.extend(&config.synonyms);

        let normalizer = SymptomNormalizer::new(catalog.vocabulary().clone())
            .with_synonyms(synonyms)
            .with_threshold(config.normalize_threshold);

        let strategy = match config.extraction {
            ExtractionMode::TokenSplit => ExtractionStrategy::TokenSplit,
            ExtractionMode::Keywords => ExtractionStrategy::Entities(Arc::new(
                KeywordRecognizer::from_vocabulary(catalog.vocabulary()),
            )),
        };

        Self {
            catalog,
            normalizer,
            strategy,
            policy: config.policy(),
        }
    }

    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_strategy(mut self, strategy: ExtractionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Extract normalized symptoms with the configured strategy.
    pub fn extract_symptoms(&self, text: &str) -> BTreeSet<String> {
        SymptomExtractor::new(&self.normalizer, &self.strategy).extract(text)
    }

    /// Rank the catalog against a symptom set.
    pub fn rank(
        &self,
        symptoms: &BTreeSet<String>,
        policy: &RankingPolicy,
    ) -> DiagnosisResult<RankedResult> {
        Ranker::new(&self.catalog).rank(symptoms, policy)
    }

    /// Extract then rank with the engine's policy.
    pub fn diagnose_text(&self, text: &str) -> DiagnosisResult<RankedResult> {
        let symptoms = self.extract_symptoms(text);
        self.rank(&symptoms, &self.policy)
    }

    /// Remedies, treatment, prevention and causes for a disease name (any case).
    pub fn remedies_for(&self, name: &str) -> DiagnosisResult<RemedyInfo> {
        self.catalog
            .get(name)
            .map(|d| d.remedy_info())
            .ok_or_else(|| DiagnosisError::UnknownDisease(name.trim().to_string()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn normalizer(&self) -> &SymptomNormalizer {
        &self.normalizer
    }

    pub fn strategy(&self) -> &ExtractionStrategy {
        &self.strategy
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }
}

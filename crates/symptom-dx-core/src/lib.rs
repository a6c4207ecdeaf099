//! Symptom-DX Core Library
//!
//! Free-text symptom diagnosis against a fixed disease catalog, with a
//! remedy/prevention dialogue on top.
//!
//! # Architecture
//!
//! ```text
//! (user id, text) ──▶ ChatService ──▶ ConversationStore (per-user lock)
//!                                           │
//!                                    DialogueMachine
//!                                           │
//!                  ┌────────────────────────┼─────────────────────────┐
//!                  ▼                        ▼                         ▼
//!          SymptomExtractor          Ranker (top-K)           LlmFallback (optional)
//!     token split │ entity spans          │
//!                 ▼                       ▼
//!         SymptomNormalizer ◀──── Catalog + SymptomVocabulary
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Disease knowledge base loader and symptom vocabulary
//! - [`models`]: Domain types (Disease, ScoredCandidate, ConversationState, etc.)
//! - [`diagnosis`]: Normalizer, extractor strategies and ranker
//! - [`dialogue`]: Stage machine and conversation store
//! - [`config`]: Engine configuration

pub mod catalog;
pub mod config;
pub mod diagnosis;
pub mod dialogue;
pub mod models;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, SymptomVocabulary};
pub use config::{EngineConfig, ExtractionMode};
pub use diagnosis::{
    DiagnosisEngine, DiagnosisError, EntityRecognizer, EntitySpan, ExtractionStrategy,
    ExtractorError, KeywordRecognizer, RankingPolicy, SymptomNormalizer, SynonymTable,
};
pub use dialogue::{
    ConversationStore, DialogueMachine, FallbackError, LlmFallback, Reply, TurnOutcome,
};
pub use models::{
    ConversationState, DiagnosisRecord, Disease, RankedResult, RemedyInfo, ScoredCandidate,
    Stage, Turn,
};

use std::sync::Arc;

// =========================================================================
// Chat Service
// =========================================================================

/// Turn handler shared by every conversation.
///
/// Owns the conversation store; the engine is read-only and shared.
pub struct ChatService {
    engine: Arc<DiagnosisEngine>,
    store: ConversationStore,
    fallback: Option<Arc<dyn LlmFallback>>,
}

impl ChatService {
    pub fn new(engine: Arc<DiagnosisEngine>) -> Self {
        tracing::info!(
            diseases = engine.catalog().len(),
            strategy = ?engine.strategy(),
            "Chat service ready"
        );
        Self {
            engine,
            store: ConversationStore::new(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn LlmFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    // =========================================================================
    // Conversation Operations
    // =========================================================================

    /// Handle one turn for a user.
    pub fn respond(&self, user_id: &str, text: &str) -> Reply {
        let machine = DialogueMachine::new(&self.engine).with_fallback(self.fallback.as_deref());
        self.store
            .with_state(user_id, |state| machine.step(state, text))
    }

    /// Copy of a user's conversation.
    pub fn conversation(&self, user_id: &str) -> Option<ConversationState> {
        self.store.snapshot(user_id)
    }

    /// Clear a user's diagnosis log.
    pub fn clear_diagnosis_log(&self, user_id: &str) -> bool {
        self.store.clear_log(user_id)
    }

    /// Forget a user's conversation.
    pub fn reset(&self, user_id: &str) -> bool {
        self.store.reset(user_id)
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    // =========================================================================
    // Stateless Operations
    // =========================================================================

    /// Rank diseases for free text without touching any conversation.
    pub fn diagnose(&self, text: &str) -> Result<RankedResult, DiagnosisError> {
        self.engine.diagnose_text(text)
    }

    /// Remedy lookup by disease name.
    pub fn remedies(&self, disease_name: &str) -> Result<RemedyInfo, DiagnosisError> {
        self.engine.remedies_for(disease_name)
    }

    pub fn engine(&self) -> &DiagnosisEngine {
        &self.engine
    }
}

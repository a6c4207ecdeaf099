//! Conversation models for the remedy dialogue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::diagnosis::ScoredCandidate;

/// Dialogue stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for symptoms or a disease name
    #[default]
    Diagnosis,
    /// A disease was named, waiting to confirm remedies
    AskRemedies,
    /// Remedies given, waiting to confirm prevention advice
    AskPrevention,
    /// Prevention given; the next turn starts over
    Done,
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One exchanged message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// A successful diagnosis kept for later review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisRecord {
    pub record_id: String,
    pub at: DateTime<Utc>,
    /// Raw user input
    pub input: String,
    /// Symptoms extracted from the input
    pub symptoms: Vec<String>,
    /// Ranked predictions, best first
    pub predictions: Vec<ScoredCandidate>,
}

impl DiagnosisRecord {
    pub fn new(input: String, symptoms: Vec<String>, predictions: Vec<ScoredCandidate>) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            at: Utc::now(),
            input,
            symptoms,
            predictions,
        }
    }
}

/// Per-user dialogue state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConversationState {
    pub stage: Stage,
    /// Name of the most recently diagnosed catalog disease
    pub last_disease: Option<String>,
    pub turn_history: Vec<Turn>,
    pub diagnosis_log: Vec<DiagnosisRecord>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget stage and disease, keeping history and log.
    pub fn restart(&mut self) {
        self.stage = Stage::Diagnosis;
        self.last_disease = None;
    }

    /// Most recent diagnosis, if any.
    pub fn latest_diagnosis(&self) -> Option<&DiagnosisRecord> {
        self.diagnosis_log.last()
    }
}

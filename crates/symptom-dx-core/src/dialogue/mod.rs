//! Remedy dialogue state machine.
//!
//! ```text
//! diagnosis ──(diagnosed / disease named)──▶ ask_remedies ──(yes)──▶ ask_prevention ──(yes)──▶ done
//!     ▲                                           │                        │                   │
//!     └─────────────── anything else: re-run diagnosis on the same input ──┴───────────────────┘
//! ```

mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnosis::{DiagnosisEngine, DiagnosisError};
use crate::models::{ConversationState, DiagnosisRecord, Disease, RankedResult, Stage, Turn};

/// Replies that confirm the pending offer.
pub const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "yeah", "yup", "ok", "okay"];

/// Shown when the LLM fallback fails.
const SERVICE_UNAVAILABLE: &str = "The assistant service is unavailable right now.";

/// LLM fallback errors.
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("Fallback service unavailable: {0}")]
    Unavailable(String),
}

pub type FallbackResult<T> = Result<T, FallbackError>;

/// Free-text responder consulted when nothing could be diagnosed.
pub trait LlmFallback: Send + Sync {
    fn reply(&self, history: &[Turn]) -> FallbackResult<String>;
}

/// What a turn did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    Diagnosed { disease: String },
    DiseaseRecognized { disease: String },
    RemediesDisclosed { disease: String },
    PreventionDisclosed { disease: String },
    NeedMoreDetail { found: usize, required: usize },
    FallbackReply,
    FallbackUnavailable,
}

/// Reply for one turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Stage after the turn
    pub stage: Stage,
    pub outcome: TurnOutcome,
}

/// Whether the input is a bare confirmation.
pub fn is_affirmative(input: &str) -> bool {
    let token = input
        .trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&token.as_str())
}

/// Drives one conversation through diagnosis, remedies and prevention.
pub struct DialogueMachine<'a> {
    engine: &'a DiagnosisEngine,
    fallback: Option<&'a dyn LlmFallback>,
}

impl<'a> DialogueMachine<'a> {
    pub fn new(engine: &'a DiagnosisEngine) -> Self {
        Self {
            engine,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Option<&'a dyn LlmFallback>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Process one user turn and mutate the conversation.
    pub fn step(&self, state: &mut ConversationState, input: &str) -> Reply {
        state.turn_history.push(Turn::user(input));
        let previous = state.stage;

        let (text, outcome) = match (state.stage, self.pending_disease(state)) {
            (Stage::AskRemedies, Some(disease)) if is_affirmative(input) => {
                state.stage = Stage::AskPrevention;
                (
                    remedies_message(disease),
                    TurnOutcome::RemediesDisclosed {
                        disease: disease.name.clone(),
                    },
                )
            }
            (Stage::AskPrevention, Some(disease)) if is_affirmative(input) => {
                state.stage = Stage::Done;
                (
                    prevention_message(disease),
                    TurnOutcome::PreventionDisclosed {
                        disease: disease.name.clone(),
                    },
                )
            }
            _ => self.diagnose(state, input),
        };

        tracing::debug!(from = ?previous, to = ?state.stage, "Dialogue transition");
        state.turn_history.push(Turn::assistant(text.clone()));

        Reply {
            text,
            stage: state.stage,
            outcome,
        }
    }

    /// Diagnosis-stage handling.
    fn diagnose(&self, state: &mut ConversationState, input: &str) -> (String, TurnOutcome) {
        let symptoms = self.engine.extract_symptoms(input);

        // A top candidate without a single good match is not a diagnosis
        let insufficient = match self.engine.rank(&symptoms, self.engine.policy()) {
            Ok(ranked) if ranked.top().is_some_and(|top| top.good_matches > 0) => {
                return self.record_diagnosis(state, input, ranked);
            }
            Ok(_) => DiagnosisError::InsufficientSymptoms {
                found: symptoms.len(),
                required: self.engine.policy().min_required,
            },
            Err(e) => e,
        };

        if let Some(disease) = self.engine.catalog().find_mentioned_in(input) {
            state.stage = Stage::AskRemedies;
            state.last_disease = Some(disease.name.clone());
            return (
                format!(
                    "I have information about {}. Would you like some home remedies for it?",
                    disease.name
                ),
                TurnOutcome::DiseaseRecognized {
                    disease: disease.name.clone(),
                },
            );
        }

        state.stage = Stage::Diagnosis;
        let (found, required) = match insufficient {
            DiagnosisError::InsufficientSymptoms { found, required } => (found, required),
            DiagnosisError::UnknownDisease(_) => (symptoms.len(), self.engine.policy().min_required),
        };

        match self.fallback {
            Some(fallback) => match fallback.reply(&state.turn_history) {
                Ok(text) => (text, TurnOutcome::FallbackReply),
                Err(e) => {
                    tracing::warn!("LLM fallback failed: {e}");
                    (
                        format!("{SERVICE_UNAVAILABLE} {}", need_more_detail_message(required)),
                        TurnOutcome::FallbackUnavailable,
                    )
                }
            },
            None => (
                need_more_detail_message(required),
                TurnOutcome::NeedMoreDetail { found, required },
            ),
        }
    }

    fn record_diagnosis(
        &self,
        state: &mut ConversationState,
        input: &str,
        ranked: RankedResult,
    ) -> (String, TurnOutcome) {
        let Some(top) = ranked.top() else {
            return (
                need_more_detail_message(self.engine.policy().min_required),
                TurnOutcome::NeedMoreDetail {
                    found: ranked.symptoms.len(),
                    required: self.engine.policy().min_required,
                },
            );
        };
        let name = top.disease.clone();
        let treatment = self
            .engine
            .catalog()
            .get(&name)
            .map(|d| d.treatment.clone())
            .unwrap_or_default();

        let mut text = format!("Based on your symptoms, you may have {name}.");
        if !treatment.is_empty() {
            text.push_str(&format!("\nTreatment: {treatment}"));
        }
        let others: Vec<&str> = ranked
            .candidates
            .iter()
            .skip(1)
            .map(|c| c.disease.as_str())
            .collect();
        if !others.is_empty() {
            text.push_str(&format!("\nOther possibilities: {}.", others.join(", ")));
        }
        text.push_str("\nWould you like some home remedies for it?");

        state.stage = Stage::AskRemedies;
        state.last_disease = Some(name.clone());
        state.diagnosis_log.push(DiagnosisRecord::new(
            input.to_string(),
            ranked.symptoms.clone(),
            ranked.candidates,
        ));

        (text, TurnOutcome::Diagnosed { disease: name })
    }

    /// The recorded disease, if it is still in the catalog.
    fn pending_disease(&self, state: &ConversationState) -> Option<&'a Disease> {
        let name = state.last_disease.as_deref()?;
        self.engine.catalog().get(name)
    }
}

fn remedies_message(disease: &Disease) -> String {
    let mut text = if disease.remedies.is_empty() {
        format!("I don't have specific home remedies listed for {}.", disease.name)
    } else {
        let mut text = format!("Here are some remedies for {}:", disease.name);
        for remedy in &disease.remedies {
            text.push_str(&format!("\n- {remedy}"));
        }
        text
    };
    text.push_str("\nWould you like some prevention tips as well?");
    text
}

fn prevention_message(disease: &Disease) -> String {
    if disease.prevention.is_empty() {
        format!("I don't have prevention advice on record for {}.", disease.name)
    } else {
        format!("To help prevent {}: {}", disease.name, disease.prevention)
    }
}

fn need_more_detail_message(required: usize) -> String {
    format!(
        "I couldn't identify a condition from that. Please describe at least {required} symptoms, \
         separated by commas (for example: fever, cough, headache)."
    )
}

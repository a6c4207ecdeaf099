//! Symptom extraction and fallback replies from LLM output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use symptom_dx_core::dialogue::FallbackResult;
use symptom_dx_core::diagnosis::ExtractorResult;
use symptom_dx_core::models::Turn;
use symptom_dx_core::{EntityRecognizer, EntitySpan, ExtractorError, FallbackError, LlmFallback};

use crate::prompts::{build_fallback_prompt, build_full_prompt, JSON_GRAMMAR};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw NER output from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerOutput {
    pub entities: Vec<EntitySpan>,
}

/// Parse model output into entity spans.
pub fn parse_ner_output(raw: &str) -> ExtractionResult<NerOutput> {
    // Models sometimes wrap the object in prose
    let json_start = raw.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = raw.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let output: NerOutput = serde_json::from_str(&raw[json_start..=json_end])?;
    Ok(output)
}

/// Text completion backend.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> ExtractionResult<String>;

    /// Generate under a GBNF grammar. Backends without grammar support
    /// ignore it and rely on `parse_ner_output` to find the object.
    fn generate_constrained(&self, prompt: &str, _grammar: &str) -> ExtractionResult<String> {
        self.generate(prompt)
    }
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> ExtractionResult<String> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> ExtractionResult<String> {
        self(prompt)
    }
}

/// Entity recognizer that asks a model for symptom spans.
pub struct LlmSymptomRecognizer<G> {
    generator: G,
    include_examples: bool,
}

impl<G: TextGenerator> LlmSymptomRecognizer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            include_examples: true,
        }
    }

    /// Toggle the few-shot examples in the prompt.
    pub fn with_examples(mut self, include_examples: bool) -> Self {
        self.include_examples = include_examples;
        self
    }

    /// Prompt, generate and parse.
    pub fn extract(&self, message: &str) -> ExtractionResult<NerOutput> {
        let prompt = build_full_prompt(message, self.include_examples);
        let raw = self.generator.generate_constrained(&prompt, JSON_GRAMMAR)?;
        let output = parse_ner_output(&raw)?;
        tracing::debug!(entities = output.entities.len(), "LLM symptom extraction");
        Ok(output)
    }
}

impl<G: TextGenerator> EntityRecognizer for LlmSymptomRecognizer<G> {
    fn recognize(&self, text: &str) -> ExtractorResult<Vec<EntitySpan>> {
        self.extract(text)
            .map(|output| output.entities)
            .map_err(|e| ExtractorError::Unavailable(e.to_string()))
    }
}

/// Conversational fallback backed by a model.
pub struct LlmFallbackResponder<G> {
    generator: G,
}

impl<G: TextGenerator> LlmFallbackResponder<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerator> LlmFallback for LlmFallbackResponder<G> {
    fn reply(&self, history: &[Turn]) -> FallbackResult<String> {
        let prompt = build_fallback_prompt(history);
        let raw = self
            .generator
            .generate(&prompt)
            .map_err(|e| FallbackError::Unavailable(e.to_string()))?;

        let text = raw.trim();
        if text.is_empty() {
            return Err(FallbackError::Unavailable("Empty response".into()));
        }
        Ok(text.to_string())
    }
}

//! LLM-backed collaborators for the symptom-dx engine.
//!
//! Provides symptom Named Entity Recognition (NER) and a conversational
//! fallback over any [`TextGenerator`] backend, plugged into the core
//! `EntityRecognizer` and `LlmFallback` traits.

pub mod extraction;
pub mod prompts;

pub use extraction::*;
pub use prompts::*;

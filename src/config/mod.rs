//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, EvaluationPrompts, Prompts};
pub use settings::{
    CostSettings, EmbeddingSettings, GeneralSettings, IndexSettings, LlmSettings, ModelRate,
    PromptSettings, Settings, StoreSettings,
};

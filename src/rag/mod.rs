//! The retrieval-augmented answer pipeline.
//!
//! Search -> Compose -> Generate -> Evaluate -> Price, assembled into one
//! immutable [`AnswerResult`] per question.

pub mod completion;
pub mod cost;
pub mod evaluate;
pub mod pipeline;
pub mod prompt;

pub use completion::{Completion, CompletionClient, OpenAICompletion};
pub use cost::CostTable;
pub use evaluate::{Evaluation, RelevanceEvaluator};
pub use pipeline::AnswerPipeline;

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};

/// Token usage for one language-model call.
///
/// Two independent instances exist per pipeline run (generation and
/// evaluation) and are never conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl UsageStats {
    /// Create usage stats. The total is derived, keeping the
    /// `total == prompt + completion` invariant by construction.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Zero usage, for runs where a call never happened.
    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

/// Automated classification of how well an answer addresses its question.
///
/// The canonical vocabulary matches what the evaluation prompt solicits.
/// `Unknown` is reserved for the evaluator-response parse-failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelevanceLabel {
    #[serde(rename = "RELEVANT")]
    Relevant,
    #[serde(rename = "PARTLY_RELEVANT")]
    PartlyRelevant,
    #[serde(rename = "NON_RELEVANT")]
    NonRelevant,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl std::fmt::Display for RelevanceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelevanceLabel::Relevant => write!(f, "RELEVANT"),
            RelevanceLabel::PartlyRelevant => write!(f, "PARTLY_RELEVANT"),
            RelevanceLabel::NonRelevant => write!(f, "NON_RELEVANT"),
            RelevanceLabel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for RelevanceLabel {
    type Err = SvarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RELEVANT" => Ok(RelevanceLabel::Relevant),
            "PARTLY_RELEVANT" => Ok(RelevanceLabel::PartlyRelevant),
            "NON_RELEVANT" => Ok(RelevanceLabel::NonRelevant),
            "UNKNOWN" => Ok(RelevanceLabel::Unknown),
            other => Err(SvarError::InvalidInput(format!(
                "Unknown relevance label: {}",
                other
            ))),
        }
    }
}

/// The terminal record of one pipeline run. Immutable after construction;
/// the store attaches a conversation id and collection when persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text.
    pub answer: String,
    /// Wall-clock seconds of the generation call only, not evaluation.
    pub response_time_seconds: f64,
    /// Self-scored relevance of the answer.
    pub relevance: RelevanceLabel,
    /// Evaluator's justification.
    pub relevance_explanation: String,
    /// Token usage of the generation call.
    pub generation_usage: UsageStats,
    /// Token usage of the evaluation call.
    pub evaluation_usage: UsageStats,
    /// Combined USD estimate for both calls.
    pub estimated_cost_usd: f64,
}

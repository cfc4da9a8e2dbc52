//! Automated relevance scoring of generated answers.

use super::prompt::build_evaluation_prompt;
use super::{CompletionClient, RelevanceLabel, UsageStats};
use crate::config::Prompts;
use crate::error::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Fixed explanation carried by the parse-failure path.
pub const PARSE_FAILURE_EXPLANATION: &str = "Failed to parse evaluation";

/// Outcome of one relevance evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub label: RelevanceLabel,
    pub explanation: String,
    pub usage: UsageStats,
}

/// The structured payload the evaluation prompt solicits. Exactly two fields.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EvaluationPayload {
    #[serde(rename = "Relevance")]
    relevance: String,
    #[serde(rename = "Explanation")]
    explanation: String,
}

/// Scores a generated answer's relevance to its question with a second
/// model call.
pub struct RelevanceEvaluator {
    client: Arc<dyn CompletionClient>,
    prompts: Prompts,
}

impl RelevanceEvaluator {
    /// Create a new evaluator.
    pub fn new(client: Arc<dyn CompletionClient>, prompts: Prompts) -> Self {
        Self { client, prompts }
    }

    /// Classify how well `answer` addresses `question`.
    ///
    /// A malformed model response is a data-quality event, not a pipeline
    /// failure: it yields `Unknown` with a fixed explanation and never
    /// raises. Transport failure of the completion call still propagates.
    #[instrument(skip(self, answer))]
    pub async fn evaluate(&self, question: &str, answer: &str) -> Result<Evaluation> {
        let prompt = build_evaluation_prompt(&self.prompts, question, answer);
        let completion = self.client.complete(&prompt).await?;

        let (label, explanation) = match parse_evaluation(&completion.text) {
            Some((label, explanation)) => (label, explanation),
            None => {
                warn!("Evaluator response did not match the solicited payload");
                (RelevanceLabel::Unknown, PARSE_FAILURE_EXPLANATION.to_string())
            }
        };

        Ok(Evaluation {
            label,
            explanation,
            usage: completion.usage,
        })
    }
}

/// Parse the evaluator's response defensively.
///
/// Models sometimes wrap JSON in markdown code fences despite instructions;
/// those are stripped before parsing. A payload that parses but names a
/// label outside the solicited vocabulary is treated as a parse failure.
fn parse_evaluation(response: &str) -> Option<(RelevanceLabel, String)> {
    let stripped = strip_code_fences(response);
    let payload: EvaluationPayload = serde_json::from_str(stripped).ok()?;

    let label = match payload.relevance.as_str() {
        "RELEVANT" => RelevanceLabel::Relevant,
        "PARTLY_RELEVANT" => RelevanceLabel::PartlyRelevant,
        "NON_RELEVANT" => RelevanceLabel::NonRelevant,
        _ => return None,
    };

    Some((label, payload.explanation))
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

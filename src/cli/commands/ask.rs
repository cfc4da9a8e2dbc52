//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::AnswerPipeline;
use crate::search::SearchMode;
use crate::store::{ConversationStore, SqliteStore};
use anyhow::Result;
use std::str::FromStr;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    collection: &str,
    mode: &str,
    limit: usize,
    no_save: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Answer) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mode = SearchMode::from_str(mode)?;
    let pipeline = AnswerPipeline::from_settings(&settings)?.with_limit(limit);

    let spinner = Output::spinner("Searching transcripts and generating answer...");

    match pipeline.answer(question, collection, mode).await {
        Ok(result) => {
            spinner.finish_and_clear();

            println!("\n{}\n", result.answer);

            Output::header("Run Details");
            Output::kv("Relevance", &result.relevance.to_string());
            Output::kv("Explanation", &result.relevance_explanation);
            Output::kv(
                "Response time",
                &format!("{:.2}s", result.response_time_seconds),
            );
            Output::kv(
                "Tokens (generation)",
                &result.generation_usage.total_tokens.to_string(),
            );
            Output::kv(
                "Tokens (evaluation)",
                &result.evaluation_usage.total_tokens.to_string(),
            );
            Output::kv(
                "Estimated cost",
                &format!("${:.6}", result.estimated_cost_usd),
            );

            if !no_save {
                let store = SqliteStore::new(&settings.sqlite_path())?;
                let conversation_id = uuid::Uuid::new_v4().to_string();
                store
                    .save_conversation(&conversation_id, question, &result, collection)
                    .await?;
                Output::kv("Conversation id", &conversation_id);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

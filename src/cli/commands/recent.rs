//! Recent command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RelevanceLabel;
use crate::store::{ConversationStore, SqliteStore};
use anyhow::Result;
use std::str::FromStr;

/// Run the recent command.
pub async fn run_recent(limit: usize, relevance: Option<&str>, settings: Settings) -> Result<()> {
    let relevance = match relevance {
        Some(s) => Some(RelevanceLabel::from_str(s)?),
        None => None,
    };

    let store = SqliteStore::new(&settings.sqlite_path())?;

    match store.recent_conversations(limit, relevance).await {
        Ok(records) => {
            if records.is_empty() {
                Output::info("No conversations recorded yet. Use 'svar ask' to get started.");
            } else {
                Output::header(&format!("Recent Conversations ({})", records.len()));
                for rec in &records {
                    Output::conversation(
                        &rec.question,
                        &rec.answer,
                        &rec.relevance.to_string(),
                        rec.feedback,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to read conversations: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

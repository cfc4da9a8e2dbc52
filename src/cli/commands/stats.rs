//! Stats command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{ConversationStore, SqliteStore};
use anyhow::Result;

/// Run the stats command.
pub async fn run_stats(settings: Settings) -> Result<()> {
    let store = SqliteStore::new(&settings.sqlite_path())?;

    match store.feedback_stats().await {
        Ok(stats) => {
            Output::header("Feedback Statistics");
            Output::kv("Thumbs up", &stats.thumbs_up.to_string());
            Output::kv("Thumbs down", &stats.thumbs_down.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to read feedback stats: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

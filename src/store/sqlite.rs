//! SQLite-based conversation store.

use super::{ConversationRecord, ConversationStore, FeedbackStats};
use crate::error::{Result, SvarError};
use crate::rag::{AnswerResult, RelevanceLabel, UsageStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    collection TEXT NOT NULL,
    response_time REAL NOT NULL,
    relevance TEXT NOT NULL,
    relevance_explanation TEXT NOT NULL,
    prompt_tokens INTEGER NOT NULL,
    completion_tokens INTEGER NOT NULL,
    total_tokens INTEGER NOT NULL,
    eval_prompt_tokens INTEGER NOT NULL,
    eval_completion_tokens INTEGER NOT NULL,
    eval_total_tokens INTEGER NOT NULL,
    estimated_cost_usd REAL NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_timestamp ON conversations(timestamp);
CREATE INDEX IF NOT EXISTS idx_conversations_relevance ON conversations(relevance);

CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    feedback INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_feedback_conversation_id ON feedback(conversation_id);
"#;

/// SQLite-based conversation store.
///
/// Writes are serialized by the connection mutex, which covers the
/// per-conversation serialization the pipeline relies on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite conversation store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SvarError::Integrity(format!("Failed to acquire lock: {}", e)))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ConversationRecord> {
        let relevance_str: String = row.get("relevance")?;
        let timestamp_str: String = row.get("timestamp")?;

        Ok(ConversationRecord {
            id: row.get("id")?,
            question: row.get("question")?,
            answer: row.get("answer")?,
            collection: row.get("collection")?,
            response_time_seconds: row.get("response_time")?,
            relevance: RelevanceLabel::from_str(&relevance_str)
                .unwrap_or(RelevanceLabel::Unknown),
            relevance_explanation: row.get("relevance_explanation")?,
            generation_usage: UsageStats::new(
                row.get("prompt_tokens")?,
                row.get("completion_tokens")?,
            ),
            evaluation_usage: UsageStats::new(
                row.get("eval_prompt_tokens")?,
                row.get("eval_completion_tokens")?,
            ),
            estimated_cost_usd: row.get("estimated_cost_usd")?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            feedback: row.get("feedback")?,
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    #[instrument(skip(self, result), fields(conversation_id = %conversation_id))]
    async fn save_conversation(
        &self,
        conversation_id: &str,
        question: &str,
        result: &AnswerResult,
        collection: &str,
    ) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO conversations (
                id, question, answer, collection, response_time, relevance,
                relevance_explanation, prompt_tokens, completion_tokens, total_tokens,
                eval_prompt_tokens, eval_completion_tokens, eval_total_tokens,
                estimated_cost_usd, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                conversation_id,
                question,
                result.answer,
                collection,
                result.response_time_seconds,
                result.relevance.to_string(),
                result.relevance_explanation,
                result.generation_usage.prompt_tokens,
                result.generation_usage.completion_tokens,
                result.generation_usage.total_tokens,
                result.evaluation_usage.prompt_tokens,
                result.evaluation_usage.completion_tokens,
                result.evaluation_usage.total_tokens,
                result.estimated_cost_usd,
                Utc::now().to_rfc3339(),
            ],
        )?;

        debug!("Saved conversation");
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    async fn save_feedback(
        &self,
        conversation_id: &str,
        value: i32,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let conn = self.lock()?;

        // The referenced conversation must exist before any row is written
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM conversations WHERE id = ?1",
                params![conversation_id],
                |_| Ok(true),
            )
            .unwrap_or(false);

        if !exists {
            return Err(SvarError::Integrity(format!(
                "Conversation not found: {}",
                conversation_id
            )));
        }

        let timestamp = timestamp.unwrap_or_else(Utc::now);

        conn.execute(
            "INSERT INTO feedback (conversation_id, feedback, timestamp) VALUES (?1, ?2, ?3)",
            params![conversation_id, value, timestamp.to_rfc3339()],
        )?;

        debug!("Saved feedback ({})", value);
        Ok(())
    }

    async fn recent_conversations(
        &self,
        limit: usize,
        relevance: Option<RelevanceLabel>,
    ) -> Result<Vec<ConversationRecord>> {
        let conn = self.lock()?;

        let base = r#"
            SELECT c.*, f.feedback
            FROM conversations c
            LEFT JOIN feedback f ON c.id = f.conversation_id
        "#;

        let records = match relevance {
            Some(label) => {
                let sql = format!("{} WHERE c.relevance = ?1 ORDER BY c.timestamp DESC LIMIT ?2", base);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![label.to_string(), limit as i64], Self::row_to_record)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql = format!("{} ORDER BY c.timestamp DESC LIMIT ?1", base);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![limit as i64], Self::row_to_record)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(records)
    }

    async fn feedback_stats(&self) -> Result<FeedbackStats> {
        let conn = self.lock()?;

        let stats = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN feedback > 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN feedback < 0 THEN 1 ELSE 0 END), 0)
            FROM feedback
            "#,
            [],
            |row| {
                Ok(FeedbackStats {
                    thumbs_up: row.get(0)?,
                    thumbs_down: row.get(1)?,
                })
            },
        )?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(relevance: RelevanceLabel) -> AnswerResult {
        AnswerResult {
            answer: "A spectrogram shows frequency content over time.".to_string(),
            response_time_seconds: 1.5,
            relevance,
            relevance_explanation: "Directly addresses the question.".to_string(),
            generation_usage: UsageStats::new(200, 80),
            evaluation_usage: UsageStats::new(90, 30),
            estimated_cost_usd: 0.0021,
        }
    }

    #[tokio::test]
    async fn test_save_and_read_conversation() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .save_conversation(
                "conv-1",
                "What is a spectrogram?",
                &result(RelevanceLabel::Relevant),
                "Audio Signal Processing for ML",
            )
            .await
            .unwrap();

        let recent = store.recent_conversations(5, None).await.unwrap();
        assert_eq!(recent.len(), 1);

        let rec = &recent[0];
        assert_eq!(rec.id, "conv-1");
        assert_eq!(rec.relevance, RelevanceLabel::Relevant);
        assert_eq!(rec.generation_usage.total_tokens, 280);
        assert_eq!(rec.evaluation_usage.total_tokens, 120);
        assert!(rec.feedback.is_none());
    }

    #[tokio::test]
    async fn test_feedback_requires_existing_conversation() {
        let store = SqliteStore::in_memory().unwrap();

        let err = store
            .save_feedback("no-such-conversation", 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SvarError::Integrity(_)));

        // No orphaned row was written
        let stats = store.feedback_stats().await.unwrap();
        assert_eq!(stats.thumbs_up, 0);
        assert_eq!(stats.thumbs_down, 0);
    }

    #[tokio::test]
    async fn test_feedback_stats_aggregation() {
        let store = SqliteStore::in_memory().unwrap();

        for id in ["a", "b", "c"] {
            store
                .save_conversation(id, "q", &result(RelevanceLabel::Relevant), "col")
                .await
                .unwrap();
        }

        store.save_feedback("a", 1, None).await.unwrap();
        store.save_feedback("b", 1, None).await.unwrap();
        store.save_feedback("c", -1, None).await.unwrap();

        let stats = store.feedback_stats().await.unwrap();
        assert_eq!(stats.thumbs_up, 2);
        assert_eq!(stats.thumbs_down, 1);
    }

    #[tokio::test]
    async fn test_recent_conversations_relevance_filter() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .save_conversation("r1", "q1", &result(RelevanceLabel::Relevant), "col")
            .await
            .unwrap();
        store
            .save_conversation("n1", "q2", &result(RelevanceLabel::NonRelevant), "col")
            .await
            .unwrap();

        let relevant = store
            .recent_conversations(10, Some(RelevanceLabel::Relevant))
            .await
            .unwrap();
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].id, "r1");
    }
}

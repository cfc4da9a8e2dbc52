//! Conversation and feedback persistence for Svar.
//!
//! The answer pipeline hands a finished [`AnswerResult`] to a store; the
//! store attaches the caller-supplied conversation id and collection name.
//! Feedback must reference an existing conversation.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::rag::{AnswerResult, RelevanceLabel, UsageStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted conversation, as read back for analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub collection: String,
    pub response_time_seconds: f64,
    pub relevance: RelevanceLabel,
    pub relevance_explanation: String,
    pub generation_usage: UsageStats,
    pub evaluation_usage: UsageStats,
    pub estimated_cost_usd: f64,
    pub timestamp: DateTime<Utc>,
    /// Latest feedback value for this conversation, if any.
    pub feedback: Option<i32>,
}

/// Aggregate feedback counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub thumbs_up: u32,
    pub thumbs_down: u32,
}

/// Trait for conversation store implementations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist one completed pipeline run atomically.
    async fn save_conversation(
        &self,
        conversation_id: &str,
        question: &str,
        result: &AnswerResult,
        collection: &str,
    ) -> Result<()>;

    /// Record signed feedback (+1/-1) against an existing conversation.
    ///
    /// Fails with an integrity error if the conversation id is unknown;
    /// feedback without a prior conversation is never silently dropped.
    async fn save_feedback(
        &self,
        conversation_id: &str,
        value: i32,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Most recent conversations, optionally filtered by relevance label.
    async fn recent_conversations(
        &self,
        limit: usize,
        relevance: Option<RelevanceLabel>,
    ) -> Result<Vec<ConversationRecord>>;

    /// Aggregate thumbs-up/down counts.
    async fn feedback_stats(&self) -> Result<FeedbackStats>;
}

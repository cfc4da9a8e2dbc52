//! Language-model completion client.

use super::UsageStats;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

/// One completed language-model call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text.
    pub text: String,
    /// Token usage of this call.
    pub usage: UsageStats,
    /// Network + inference round trip of this call only.
    pub elapsed_seconds: f64,
}

/// Trait for language-model completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a prompt and return the generated text with usage and latency.
    ///
    /// Transport and API errors propagate; there is no retry here.
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Model id used for generation, for cost attribution.
    fn model(&self) -> &str;
}

/// OpenAI chat-completion backend with fixed decoding parameters.
///
/// The parameters are part of the reproducibility contract: changing them
/// changes what the downstream evaluator is judging.
pub struct OpenAICompletion {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAICompletion {
    /// Create a new completion client.
    pub fn new(model: &str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletion {
    #[instrument(skip(self, prompt))]
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| SvarError::Completion(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .n(1)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?;

        let started = Instant::now();
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Completion request failed: {}", e)))?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::Completion("Empty response from model".to_string()))?
            .clone();

        let usage = response
            .usage
            .map(|u| UsageStats::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_else(UsageStats::zero);

        debug!(
            "Completion finished in {:.2}s ({} tokens)",
            elapsed_seconds, usage.total_tokens
        );

        Ok(Completion {
            text,
            usage,
            elapsed_seconds,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

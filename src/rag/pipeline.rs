//! Answer pipeline orchestration.
//!
//! One linear run per question: Search -> Compose -> Generate -> Evaluate
//! -> Price. No step is retried; any failure aborts the run and no partial
//! result escapes. The pipeline is stateless across runs and safely
//! reentrant, so concurrent questions need no coordination here.

use super::prompt::build_answer_prompt;
use super::{
    AnswerResult, CompletionClient, CostTable, OpenAICompletion, RelevanceEvaluator,
};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::index::{ElasticIndex, MemoryIndex, SearchIndex};
use crate::search::{SearchGateway, SearchMode, DEFAULT_LIMIT};
use std::sync::Arc;
use tracing::{info, instrument};

/// The retrieval-augmented answer pipeline.
///
/// All collaborators are injected, so tests can substitute doubles for the
/// index, embedder, and both model clients.
pub struct AnswerPipeline {
    gateway: SearchGateway,
    prompts: Prompts,
    generation: Arc<dyn CompletionClient>,
    evaluation: Arc<dyn CompletionClient>,
    costs: CostTable,
    limit: usize,
}

impl AnswerPipeline {
    /// Create a pipeline from explicit components.
    pub fn new(
        index: Arc<dyn SearchIndex>,
        embedder: Arc<dyn Embedder>,
        generation: Arc<dyn CompletionClient>,
        evaluation: Arc<dyn CompletionClient>,
        prompts: Prompts,
        costs: CostTable,
    ) -> Self {
        Self {
            gateway: SearchGateway::new(index, embedder),
            prompts,
            generation,
            evaluation,
            costs,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Set the number of evidence snippets retrieved per question.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the candidate pool size for nearest-neighbor retrieval.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.gateway = self.gateway.with_num_candidates(num_candidates);
        self
    }

    /// Build a pipeline from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let index: Arc<dyn SearchIndex> = match settings.index.provider.as_str() {
            "elastic" => Arc::new(ElasticIndex::new(
                &settings.index.url,
                &settings.index.index_name,
                settings.embedding.dimensions as usize,
            )?),
            "memory" => Arc::new(MemoryIndex::new(settings.embedding.dimensions as usize)),
            other => {
                return Err(SvarError::Config(format!(
                    "Unknown index provider: {}",
                    other
                )))
            }
        };

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let generation: Arc<dyn CompletionClient> = Arc::new(OpenAICompletion::new(
            &settings.llm.model,
            settings.llm.max_tokens,
            settings.llm.temperature,
        ));
        let evaluation: Arc<dyn CompletionClient> = Arc::new(OpenAICompletion::new(
            &settings.llm.evaluation_model,
            settings.llm.max_tokens,
            settings.llm.temperature,
        ));

        let costs = CostTable::new(&settings.costs);

        Ok(Self::new(index, embedder, generation, evaluation, prompts, costs)
            .with_limit(settings.index.limit)
            .with_num_candidates(settings.index.num_candidates))
    }

    /// Answer a question over the given collection.
    #[instrument(skip(self), fields(collection = %collection, mode = %mode))]
    pub async fn answer(
        &self,
        question: &str,
        collection: &str,
        mode: SearchMode,
    ) -> Result<AnswerResult> {
        info!("Answering question: {}", question);

        // Search
        let evidence = self
            .gateway
            .search(question, collection, mode, self.limit)
            .await?;

        // Compose + generate
        let prompt = build_answer_prompt(&self.prompts, question, &evidence);
        let completion = self.generation.complete(&prompt).await?;

        // Evaluate the generated answer
        let evaluator = RelevanceEvaluator::new(self.evaluation.clone(), self.prompts.clone());
        let evaluation = evaluator.evaluate(question, &completion.text).await?;

        // Price both calls; kept separate until the final sum so per-call
        // costs stay auditable.
        let generation_cost = self
            .costs
            .estimate_cost_usd(&completion.usage, self.generation.model())?;
        let evaluation_cost = self
            .costs
            .estimate_cost_usd(&evaluation.usage, self.evaluation.model())?;

        info!(
            "Answer generated in {:.2}s, scored {} (${:.6})",
            completion.elapsed_seconds,
            evaluation.label,
            generation_cost + evaluation_cost
        );

        Ok(AnswerResult {
            answer: completion.text,
            response_time_seconds: completion.elapsed_seconds,
            relevance: evaluation.label,
            relevance_explanation: evaluation.explanation,
            generation_usage: completion.usage,
            evaluation_usage: evaluation.usage,
            estimated_cost_usd: generation_cost + evaluation_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostSettings, ModelRate};
    use crate::index::SegmentHit;
    use crate::rag::{Completion, RelevanceLabel, UsageStats};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }
    }

    /// Records prompts and returns scripted responses in order.
    struct ScriptedClient {
        prompts_seen: Mutex<Vec<String>>,
        responses: Mutex<Vec<Completion>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Completion>) -> Self {
            Self {
                prompts_seen: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<Completion> {
            self.prompts_seen.lock().unwrap().push(prompt.to_string());
            Ok(self.responses.lock().unwrap().remove(0))
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn completion(text: &str, prompt_tokens: u32, completion_tokens: u32) -> Completion {
        Completion {
            text: text.to_string(),
            usage: UsageStats::new(prompt_tokens, completion_tokens),
            elapsed_seconds: 0.25,
        }
    }

    fn costs() -> CostTable {
        let mut settings = CostSettings::default();
        settings.rates.insert(
            "test-model".to_string(),
            ModelRate {
                prompt_per_1k: 0.005,
                completion_per_1k: 0.015,
            },
        );
        CostTable::new(&settings)
    }

    fn corpus_index() -> Arc<MemoryIndex> {
        let index = Arc::new(MemoryIndex::new(2));
        for i in 0..5 {
            index.insert(
                SegmentHit {
                    id: format!("seg-{}", i),
                    text: format!("spectrogram excerpt {}", i),
                    source_title: "Spectrograms Explained".to_string(),
                    collection: "Audio Signal Processing for ML".to_string(),
                    external_link: format!("https://youtube.com/watch?v=abc&t={}s", i * 60),
                },
                vec![1.0, i as f32 * 0.1],
            );
        }
        index
    }

    #[tokio::test]
    async fn test_end_to_end_vector_run() {
        let generation = Arc::new(ScriptedClient::new(vec![completion(
            "A spectrogram is a visual representation of the spectrum of frequencies.",
            200,
            80,
        )]));
        let evaluation = Arc::new(ScriptedClient::new(vec![completion(
            r#"{"Relevance": "RELEVANT", "Explanation": "Answers the question."}"#,
            90,
            30,
        )]));

        let pipeline = AnswerPipeline::new(
            corpus_index(),
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
            generation.clone(),
            evaluation,
            Prompts::default(),
            costs(),
        );

        let result = pipeline
            .answer(
                "What is a spectrogram?",
                "Audio Signal Processing for ML",
                SearchMode::Vector,
            )
            .await
            .unwrap();

        // The answer prompt contained the question and all 5 snippet texts
        let prompts_seen = generation.prompts_seen.lock().unwrap();
        assert!(prompts_seen[0].contains("What is a spectrogram?"));
        for i in 0..5 {
            assert!(prompts_seen[0].contains(&format!("spectrogram excerpt {}", i)));
        }

        assert!(!result.answer.is_empty());
        assert!(result.generation_usage.total_tokens > 0);
        assert_eq!(result.relevance, RelevanceLabel::Relevant);
        assert_eq!(result.response_time_seconds, 0.25);
        assert!(result.estimated_cost_usd >= 0.0);
        // Two usage objects, never conflated
        assert_eq!(result.generation_usage.total_tokens, 280);
        assert_eq!(result.evaluation_usage.total_tokens, 120);
    }

    #[tokio::test]
    async fn test_empty_evidence_still_answers() {
        let generation = Arc::new(ScriptedClient::new(vec![completion(
            "I could not find that in the provided context.",
            50,
            15,
        )]));
        let evaluation = Arc::new(ScriptedClient::new(vec![completion(
            r#"{"Relevance": "NON_RELEVANT", "Explanation": "No supporting context."}"#,
            40,
            20,
        )]));

        let pipeline = AnswerPipeline::new(
            Arc::new(MemoryIndex::new(2)),
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
            generation,
            evaluation,
            Prompts::default(),
            costs(),
        );

        let result = pipeline
            .answer("What is MFCC?", "missing-collection", SearchMode::Lexical)
            .await
            .unwrap();

        assert_eq!(result.relevance, RelevanceLabel::NonRelevant);
    }

    #[tokio::test]
    async fn test_unknown_model_rate_aborts_run() {
        let generation = Arc::new(ScriptedClient::new(vec![completion("answer", 10, 10)]));
        let evaluation = Arc::new(ScriptedClient::new(vec![completion(
            r#"{"Relevance": "RELEVANT", "Explanation": "ok"}"#,
            10,
            10,
        )]));

        let pipeline = AnswerPipeline::new(
            corpus_index(),
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
            generation,
            evaluation,
            Prompts::default(),
            CostTable::new(&CostSettings::default()),
        );

        let err = pipeline
            .answer(
                "What is a spectrogram?",
                "Audio Signal Processing for ML",
                SearchMode::Lexical,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SvarError::Config(_)));
    }
}

//! Search gateway: mode dispatch between lexical and vector retrieval.
//!
//! The gateway is the only place raw index hits become typed evidence; the
//! rest of the pipeline is mode-agnostic and never sees engine documents.

use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use crate::index::{SearchIndex, SegmentHit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default number of evidence snippets per question.
pub const DEFAULT_LIMIT: usize = 5;

/// Retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Multi-field keyword search.
    Lexical,
    /// Nearest-neighbor search over dense embeddings.
    Vector,
}

impl std::str::FromStr for SearchMode {
    type Err = SvarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lexical" | "text" | "keyword" => Ok(SearchMode::Lexical),
            "vector" | "semantic" => Ok(SearchMode::Vector),
            other => Err(SvarError::Config(format!(
                "Unsupported search mode: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Lexical => write!(f, "lexical"),
            SearchMode::Vector => write!(f, "vector"),
        }
    }
}

/// One retrieved transcript excerpt with source attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSnippet {
    /// Segment id.
    pub id: String,
    /// Transcript excerpt.
    pub text: String,
    /// Title of the source video.
    pub source_title: String,
    /// Deep link into the source, with timestamp.
    pub external_link: String,
    /// Collection the search was scoped to.
    pub collection: String,
}

impl From<SegmentHit> for EvidenceSnippet {
    fn from(hit: SegmentHit) -> Self {
        Self {
            id: hit.id,
            text: hit.text,
            source_title: hit.source_title,
            external_link: hit.external_link,
            collection: hit.collection,
        }
    }
}

/// Dispatches a question to the configured retrieval strategy.
pub struct SearchGateway {
    index: Arc<dyn SearchIndex>,
    embedder: Arc<dyn Embedder>,
    num_candidates: usize,
}

impl SearchGateway {
    /// Create a new search gateway.
    pub fn new(index: Arc<dyn SearchIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            num_candidates: 10_000,
        }
    }

    /// Set the candidate pool size for nearest-neighbor retrieval.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates;
        self
    }

    /// Retrieve up to `limit` evidence snippets for a question, scoped to
    /// `collection`. Zero hits returns an empty vec, not an error.
    #[instrument(skip(self), fields(mode = %mode, collection = %collection))]
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<EvidenceSnippet>> {
        info!("Running {} search", mode);

        let hits = match mode {
            SearchMode::Lexical => self.index.lexical_search(query, collection, limit).await?,
            SearchMode::Vector => {
                let query_vector = self.embedder.embed(query).await?;
                if query_vector.len() != self.index.dimensions() {
                    return Err(SvarError::Embedding(format!(
                        "Embedding dimensions ({}) do not match index dimensions ({})",
                        query_vector.len(),
                        self.index.dimensions()
                    )));
                }
                self.index
                    .knn_search(&query_vector, collection, limit, self.num_candidates)
                    .await?
            }
        };

        debug!("Retrieved {} snippets", hits.len());

        Ok(hits.into_iter().map(EvidenceSnippet::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use async_trait::async_trait;
    use std::str::FromStr;

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

    fn hit(id: &str, text: &str, collection: &str) -> SegmentHit {
        SegmentHit {
            id: id.to_string(),
            text: text.to_string(),
            source_title: format!("Video {}", id),
            collection: collection.to_string(),
            external_link: format!("https://youtube.com/watch?v={}&t=30s", id),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(SearchMode::from_str("Text").unwrap(), SearchMode::Lexical);
        assert_eq!(SearchMode::from_str("vector").unwrap(), SearchMode::Vector);
        assert!(matches!(
            SearchMode::from_str("hybrid"),
            Err(SvarError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_lexical_results_stay_in_collection() {
        let index = Arc::new(MemoryIndex::new(2));
        index.insert(
            hit("a", "MFCC explained in depth", "Audio Signal Processing for ML"),
            vec![1.0, 0.0],
        );
        index.insert(
            hit("b", "MFCC for networks", "Audio Deep Learning with Python"),
            vec![0.0, 1.0],
        );

        let gateway = SearchGateway::new(
            index,
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
        );

        let snippets = gateway
            .search(
                "what is MFCC",
                "Audio Signal Processing for ML",
                SearchMode::Lexical,
                5,
            )
            .await
            .unwrap();

        assert!(!snippets.is_empty());
        assert!(snippets
            .iter()
            .all(|s| s.collection == "Audio Signal Processing for ML"));
    }

    #[tokio::test]
    async fn test_vector_search_dimension_mismatch_rejected() {
        let index = Arc::new(MemoryIndex::new(3));
        let gateway = SearchGateway::new(
            index,
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
        );

        let err = gateway
            .search("anything", "c", SearchMode::Vector, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, SvarError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_empty_collection_returns_empty() {
        let index = Arc::new(MemoryIndex::new(2));
        let gateway = SearchGateway::new(
            index,
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
        );

        let snippets = gateway
            .search("anything", "empty", SearchMode::Vector, 5)
            .await
            .unwrap();
        assert!(snippets.is_empty());
    }
}

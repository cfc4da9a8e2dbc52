//! Elasticsearch-shaped HTTP index client.
//!
//! Speaks the `_search` body shape: a `multi_match` bool query with a
//! collection term filter for lexical retrieval, and a top-level `knn`
//! clause for vector retrieval.

use super::{SearchIndex, SegmentHit};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Fixed multi-field boosts for lexical retrieval. Hand-tuned; changing
/// them changes answer quality materially.
const LEXICAL_FIELDS: [&str; 4] = ["text^4", "video^2", "playlist", "youtube_link"];

/// Dense vector field holding segment embeddings.
const VECTOR_FIELD: &str = "text_vector";

/// HTTP client for an Elasticsearch-compatible index.
pub struct ElasticIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
    dimensions: usize,
}

impl ElasticIndex {
    /// Create a new index client.
    pub fn new(base_url: &str, index_name: &str, dimensions: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index_name: index_name.to_string(),
            dimensions,
        })
    }

    async fn search_body(&self, body: serde_json::Value) -> Result<Vec<SegmentHit>> {
        let url = format!("{}/{}/_search", self.base_url, self.index_name);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(SvarError::Search(format!(
                "Index query failed with status {}: {}",
                status, detail
            )));
        }

        let parsed: SearchResponse = response.json().await?;

        let hits = parsed.hits.hits;
        if hits.is_empty() {
            warn!("No hits found in the index response");
        } else {
            debug!("Index query returned {} hits", hits.len());
        }

        Ok(hits.into_iter().map(|h| h.source).collect())
    }
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn lexical_search(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<SegmentHit>> {
        let body = json!({
            "size": limit,
            "query": {
                "bool": {
                    "must": {
                        "multi_match": {
                            "query": query,
                            "fields": LEXICAL_FIELDS,
                            "type": "best_fields"
                        }
                    },
                    "filter": {
                        "term": {
                            "playlist": collection
                        }
                    }
                }
            }
        });

        self.search_body(body).await
    }

    #[instrument(skip(self, query_vector), fields(collection = %collection))]
    async fn knn_search(
        &self,
        query_vector: &[f32],
        collection: &str,
        limit: usize,
        num_candidates: usize,
    ) -> Result<Vec<SegmentHit>> {
        let body = json!({
            "knn": {
                "field": VECTOR_FIELD,
                "query_vector": query_vector,
                "k": limit,
                "num_candidates": num_candidates,
                "filter": {
                    "term": {
                        "playlist": collection
                    }
                }
            },
            "_source": ["id", "text", "video", "playlist", "youtube_link"]
        });

        self.search_body(body).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// Minimal slice of the _search response envelope.

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: SegmentHit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_envelope_parsing() {
        let raw = serde_json::json!({
            "took": 3,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [
                    {
                        "_index": "video-transcripts",
                        "_id": "x",
                        "_score": 7.2,
                        "_source": {
                            "id": "seg-1",
                            "text": "MFCCs capture the spectral envelope.",
                            "video": "MFCC Explained",
                            "playlist": "Audio Signal Processing for ML",
                            "youtube_link": "https://youtube.com/watch?v=abc&t=42s"
                        }
                    }
                ]
            }
        });

        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.hits.hits.len(), 1);
        assert_eq!(parsed.hits.hits[0].source.id, "seg-1");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let index = ElasticIndex::new("http://localhost:9200/", "segments", 384).unwrap();
        assert_eq!(index.base_url, "http://localhost:9200");
        assert_eq!(index.dimensions(), 384);
    }
}

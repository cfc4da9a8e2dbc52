//! Search index abstraction for Svar.
//!
//! Provides a trait-based interface over the transcript index so the answer
//! pipeline depends on a query shape, not on a specific engine's wire format.
//! Index creation and bulk loading are handled by external tooling; this
//! module is read-only with respect to the index.

mod elastic;
mod memory;

pub use elastic::ElasticIndex;
pub use memory::MemoryIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One transcript segment as stored in the index.
///
/// Wire field names (`video`, `playlist`, `youtube_link`) match the index
/// schema the ingestion tooling writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentHit {
    /// Segment id.
    pub id: String,
    /// Transcript excerpt.
    pub text: String,
    /// Title of the source video.
    #[serde(rename = "video")]
    pub source_title: String,
    /// Collection (playlist) this segment belongs to.
    #[serde(rename = "playlist")]
    pub collection: String,
    /// Deep link into the source, with timestamp.
    #[serde(rename = "youtube_link")]
    pub external_link: String,
}

/// Trait for search index query implementations.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Multi-field keyword search, filtered to `collection`.
    ///
    /// Field boosting is fixed (transcript text weighted highest) and part
    /// of the retrieval contract.
    async fn lexical_search(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<SegmentHit>>;

    /// Approximate nearest-neighbor search over the dense text vector,
    /// filtered to `collection`. `num_candidates` is the recall pool
    /// considered before top-k truncation.
    async fn knn_search(
        &self,
        query_vector: &[f32],
        collection: &str,
        limit: usize,
        num_candidates: usize,
    ) -> Result<Vec<SegmentHit>>;

    /// Dimensionality of the index's vector space.
    fn dimensions(&self) -> usize;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_segment_hit_wire_names() {
        let json = serde_json::json!({
            "id": "seg-1",
            "text": "A spectrogram is a visual representation of frequencies.",
            "video": "Spectrograms Explained",
            "playlist": "Audio Signal Processing for ML",
            "youtube_link": "https://youtube.com/watch?v=abc&t=120s"
        });
        let hit: SegmentHit = serde_json::from_value(json).unwrap();
        assert_eq!(hit.source_title, "Spectrograms Explained");
        assert_eq!(hit.collection, "Audio Signal Processing for ML");
    }
}

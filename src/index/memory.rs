//! In-memory search index implementation.
//!
//! Useful for testing and small local corpora. Lexical scoring is a boosted
//! term-frequency approximation of the engine's best-fields ranking; vector
//! scoring is exact cosine similarity.

use super::{cosine_similarity, SearchIndex, SegmentHit};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::RwLock;

/// A segment plus its embedding, as held by the in-memory index.
#[derive(Debug, Clone)]
pub struct MemorySegment {
    pub hit: SegmentHit,
    pub embedding: Vec<f32>,
}

/// In-memory search index.
pub struct MemoryIndex {
    segments: RwLock<Vec<MemorySegment>>,
    dimensions: usize,
}

impl MemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new(dimensions: usize) -> Self {
        Self {
            segments: RwLock::new(Vec::new()),
            dimensions,
        }
    }

    /// Add a segment to the index.
    pub fn insert(&self, hit: SegmentHit, embedding: Vec<f32>) {
        let mut segments = self.segments.write().unwrap();
        segments.push(MemorySegment { hit, embedding });
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    /// Boosted term-frequency score across the same fields and weights the
    /// engine-backed index uses: text^4, source title^2, collection, link.
    fn lexical_score(query_terms: &[String], hit: &SegmentHit) -> f32 {
        let fields: [(&str, f32); 4] = [
            (&hit.text, 4.0),
            (&hit.source_title, 2.0),
            (&hit.collection, 1.0),
            (&hit.external_link, 1.0),
        ];

        let mut score = 0.0;
        for (field, boost) in fields {
            let tokens = Self::tokenize(field);
            for term in query_terms {
                let matches = tokens.iter().filter(|t| *t == term).count();
                score += boost * matches as f32;
            }
        }
        score
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn lexical_search(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<SegmentHit>> {
        let query_terms = Self::tokenize(query);
        let segments = self.segments.read().unwrap();

        let mut scored: Vec<(f32, SegmentHit)> = segments
            .iter()
            .filter(|s| s.hit.collection == collection)
            .map(|s| (Self::lexical_score(&query_terms, &s.hit), s.hit.clone()))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn knn_search(
        &self,
        query_vector: &[f32],
        collection: &str,
        limit: usize,
        _num_candidates: usize,
    ) -> Result<Vec<SegmentHit>> {
        let segments = self.segments.read().unwrap();

        let mut scored: Vec<(f32, SegmentHit)> = segments
            .iter()
            .filter(|s| s.hit.collection == collection)
            .map(|s| (cosine_similarity(query_vector, &s.embedding), s.hit.clone()))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, text: &str, collection: &str) -> SegmentHit {
        SegmentHit {
            id: id.to_string(),
            text: text.to_string(),
            source_title: format!("Video {}", id),
            collection: collection.to_string(),
            external_link: format!("https://youtube.com/watch?v={}&t=0s", id),
        }
    }

    #[tokio::test]
    async fn test_lexical_search_filters_by_collection() {
        let index = MemoryIndex::new(3);
        index.insert(
            segment("a", "MFCC stands for mel-frequency cepstral coefficients", "Audio Signal Processing for ML"),
            vec![1.0, 0.0, 0.0],
        );
        index.insert(
            segment("b", "MFCC features for deep learning", "Audio Deep Learning with Python"),
            vec![0.0, 1.0, 0.0],
        );

        let hits = index
            .lexical_search("what is MFCC", "Audio Signal Processing for ML", 5)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert!(hits
            .iter()
            .all(|h| h.collection == "Audio Signal Processing for ML"));
    }

    #[tokio::test]
    async fn test_lexical_search_ranks_text_matches_highest() {
        let index = MemoryIndex::new(3);
        index.insert(segment("a", "nothing of note here", "c"), vec![0.0; 3]);
        index.insert(
            segment("b", "a spectrogram shows frequency over time", "c"),
            vec![0.0; 3],
        );

        let hits = index.lexical_search("spectrogram", "c", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[tokio::test]
    async fn test_knn_search_orders_by_similarity() {
        let index = MemoryIndex::new(3);
        index.insert(segment("far", "x", "c"), vec![0.0, 1.0, 0.0]);
        index.insert(segment("near", "y", "c"), vec![1.0, 0.0, 0.0]);

        let hits = index
            .knn_search(&[1.0, 0.0, 0.0], "c", 2, 10_000)
            .await
            .unwrap();

        assert_eq!(hits[0].id, "near");
        assert_eq!(hits[1].id, "far");
    }

    #[tokio::test]
    async fn test_zero_hits_is_empty_not_error() {
        let index = MemoryIndex::new(3);
        let hits = index.lexical_search("anything", "missing", 5).await.unwrap();
        assert!(hits.is_empty());
    }
}

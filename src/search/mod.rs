//! Hybrid search with semantic and lexical retrieval.
//!
//! Combines vector similarity search with FTS5 BM25 using Reciprocal Rank
//! Fusion (RRF), running both branches concurrently.

mod rrf;

pub use rrf::{RrfConfig, reciprocal_rank_fusion, weighted_rrf};

use crate::core::Chunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::storage::{KeywordStore, VectorStore};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Default number of results each branch fetches before fusion.
pub const DEFAULT_TOP_K: usize = 10;

/// Fans vector and keyword search out concurrently and fuses the results.
///
/// See [`HybridRetriever::search`] for the fusion contract.
pub struct HybridRetriever {
    vector: Arc<dyn VectorStore>,
    keyword: Arc<dyn KeywordStore>,
    embedder: Arc<dyn Embedder>,
    rrf_k: u32,
}

impl HybridRetriever {
    /// Creates a new hybrid retriever over the given backends, using the
    /// paper-recommended RRF constant `k=60`.
    #[must_use]
    pub fn new(
        vector: Arc<dyn VectorStore>,
        keyword: Arc<dyn KeywordStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            vector,
            keyword,
            embedder,
            rrf_k: 60,
        }
    }

    /// Overrides the RRF `k` parameter.
    #[must_use]
    pub const fn with_rrf_k(mut self, k: u32) -> Self {
        self.rrf_k = k;
        self
    }

    /// Runs vector and keyword search concurrently and fuses the results
    /// with Reciprocal Rank Fusion.
    ///
    /// If one branch fails, the failure is logged and the other branch's
    /// results are used alone. If both fail, the vector branch's error is
    /// returned (the primary path). The returned list is deduplicated by
    /// chunk content (first occurrence wins) and is NOT truncated to
    /// `top_k` — the caller decides how many chunks to use.
    ///
    /// # Errors
    ///
    /// Returns an error if both the vector and keyword branches fail.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>> {
        let vector = Arc::clone(&self.vector);
        let embedder = Arc::clone(&self.embedder);
        let keyword = Arc::clone(&self.keyword);

        let vector_filters = filters.clone();
        let vector_query = query.to_string();
        let vector_branch = async move {
            let query_vector = embedder.embed(&vector_query).await?;
            if vector_filters.is_empty() {
                vector.search(&query_vector, top_k)
            } else {
                vector.search_with_filters(&query_vector, top_k, &vector_filters)
            }
        };

        let keyword_query = query.to_string();
        let keyword_branch = async move { keyword.search(&keyword_query, top_k) };

        let (vector_result, keyword_result) = tokio::join!(vector_branch, keyword_branch);

        let (vector_chunks, keyword_chunks) = match (vector_result, keyword_result) {
            (Ok(v), Ok(k)) => (v, k),
            (Ok(v), Err(e)) => {
                tracing::warn!(error = %e, "keyword search failed, proceeding with vector results only");
                (v, Vec::new())
            }
            (Err(e), Ok(k)) => {
                tracing::warn!(error = %e, "vector search failed, proceeding with keyword results only");
                (Vec::new(), k)
            }
            (Err(e), Err(_)) => return Err(e),
        };

        Ok(fuse(&vector_chunks, &keyword_chunks, self.rrf_k))
    }
}

/// Fuses two rank-ordered chunk lists by Reciprocal Rank Fusion, then
/// deduplicates by content (first occurrence by fused rank wins).
fn fuse(vector_chunks: &[Chunk], keyword_chunks: &[Chunk], rrf_k: u32) -> Vec<Chunk> {
    let vector_ids: Vec<String> = vector_chunks.iter().map(|c| c.id.clone()).collect();
    let keyword_ids: Vec<String> = keyword_chunks.iter().map(|c| c.id.clone()).collect();

    let config = RrfConfig::new(rrf_k);
    let fused = reciprocal_rank_fusion(&[&vector_ids, &keyword_ids], &config);

    let mut by_id: HashMap<&str, &Chunk> = HashMap::new();
    for chunk in vector_chunks.iter().chain(keyword_chunks.iter()) {
        by_id.entry(chunk.id.as_str()).or_insert(chunk);
    }

    let mut seen_content = HashSet::new();
    let mut results = Vec::with_capacity(fused.len());

    for (id, score) in fused {
        let Some(chunk) = by_id.get(id.as_str()) else {
            continue;
        };
        if !seen_content.insert(chunk.content.clone()) {
            continue;
        }
        let mut chunk = (*chunk).clone();
        chunk.score = Some(score);
        results.push(chunk);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
    use crate::storage::{DocumentStore, SqliteStore};

    fn chunk(document_id: &str, ordinal: usize, content: &str) -> Chunk {
        Chunk::new(document_id, ordinal, content.to_string(), HashMap::new())
    }

    #[test]
    fn fuse_unions_by_id_and_keeps_first_seen_content() {
        let a = chunk("doc1", 0, "alpha content");
        let b = chunk("doc1", 1, "beta content");
        let c = chunk("doc2", 0, "gamma content");

        let vector_chunks = vec![a.clone(), b.clone()];
        let keyword_chunks = vec![c.clone(), a.clone()];

        let fused = fuse(&vector_chunks, &keyword_chunks, 60);

        let ids: Vec<&str> = fused.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&a.id.as_str()));
        assert!(ids.contains(&b.id.as_str()));
        assert!(ids.contains(&c.id.as_str()));
        assert_eq!(fused.len(), 3);
    }

    #[test]
    fn fuse_deduplicates_by_content() {
        let a = chunk("doc1", 0, "duplicate content");
        let mut b = chunk("doc2", 0, "duplicate content");
        b.id = "doc2#0".to_string();

        let fused = fuse(&[a.clone()], &[b], 60);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].id, a.id);
    }

    #[test]
    fn fuse_ranks_items_in_both_lists_highest() {
        let a = chunk("doc1", 0, "in both lists");
        let b = chunk("doc1", 1, "only vector");
        let c = chunk("doc1", 2, "only keyword");

        let fused = fuse(&[a.clone(), b], &[a.clone(), c], 60);
        assert_eq!(fused[0].id, a.id);
        assert!(fused[0].score.unwrap() > fused[1].score.unwrap());
    }

    #[tokio::test]
    async fn hybrid_search_merges_vector_and_keyword_hits() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.init().unwrap();
        let embedder = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));

        let doc = crate::core::Document::new(
            crate::core::DocumentSource::Inline,
            "content".to_string(),
            HashMap::new(),
        );
        store.put_document(&doc).unwrap();

        let chunks = vec![
            Chunk::new(&doc.id, 0, "the quick brown fox".to_string(), HashMap::new()),
            Chunk::new(&doc.id, 1, "rust systems programming".to_string(), HashMap::new()),
        ];
        store.put_chunks(&chunks).unwrap();
        for c in &chunks {
            let mut c = c.clone();
            c.vector = embedder.embed(&c.content).await.unwrap();
            store.index(&c).unwrap();
        }

        let retriever = HybridRetriever::new(
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&store) as Arc<dyn KeywordStore>,
            embedder,
        );

        let results = retriever
            .search("rust programming", 10, &HashMap::new())
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().any(|c| c.content.contains("rust")));
    }

    #[tokio::test]
    async fn hybrid_search_with_no_matches_returns_empty() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.init().unwrap();
        let embedder = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));

        let retriever = HybridRetriever::new(
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&store) as Arc<dyn KeywordStore>,
            embedder,
        );

        let results = retriever
            .search("nothing indexed yet", 10, &HashMap::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}

//! Semantic retrieval over the vector index

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::embeddings::Embedder;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::models::SegmentHit;
use crate::store::VectorIndex;

/// Embeds a question and fetches its nearest segments
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Top-`limit` segments for `query`, optionally within one document.
    ///
    /// # Errors
    /// - `GenerationFailed` when the question cannot be embedded
    /// - `RetrievalFailed` when the index query fails
    pub async fn semantic_search(
        &self,
        query: &str,
        limit: usize,
        scope: Option<Uuid>,
    ) -> Result<Vec<SegmentHit>> {
        debug!("Performing semantic search: {}", query);

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| DocRagError::GenerationFailed(format!("question embedding: {e}")))?;

        let hits = self
            .index
            .search(&query_embedding, limit, scope)
            .await
            .map_err(|e| DocRagError::RetrievalFailed(e.to_string()))?;

        debug!("Retrieved {} segments", hits.len());
        Ok(hits)
    }
}

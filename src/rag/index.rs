use std::sync::Arc;

use super::store::{ScoredChunk, StoredChunk, VectorStore};
use super::PipelineError;
use crate::llm::{LlmProvider, ProviderError};

/// Couples an embedding provider with a storage backend. The only
/// stateful, long-lived piece of the pipeline.
#[derive(Clone)]
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn LlmProvider>,
}

impl VectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn LlmProvider>) -> Self {
        Self { store, embedder }
    }

    /// Embed and store a batch of chunks. The whole call fails with
    /// nothing committed if the embedding service errors; the store
    /// commit itself is transactional.
    pub async fn insert(&self, chunks: Vec<StoredChunk>) -> Result<usize, PipelineError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let inputs: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self
            .embedder
            .embed(&inputs)
            .await
            .map_err(PipelineError::EmbeddingBackend)?;

        if embeddings.len() != chunks.len() {
            return Err(PipelineError::EmbeddingBackend(
                ProviderError::MalformedResponse("embedding batch size mismatch"),
            ));
        }

        let inserted = chunks.len();
        let items: Vec<(StoredChunk, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();
        self.store.insert_batch(items).await?;

        Ok(inserted)
    }

    /// Embed the query and return the top-`k` nearest chunks with scores,
    /// highest first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, PipelineError> {
        let embeddings = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(PipelineError::EmbeddingBackend)?;

        let query_embedding = embeddings
            .first()
            .ok_or(PipelineError::EmbeddingBackend(
                ProviderError::MalformedResponse("empty embedding batch"),
            ))?;

        Ok(self.store.search(query_embedding, k).await?)
    }
}

//! In-memory vector store for the seed-corpus deployment mode.
//!
//! Nothing is persisted; the index lives for the lifetime of the process
//! and is rebuilt from the configured seed sources on startup.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{cosine_similarity, ScoredChunk, StoreError, StoredChunk, VectorStore};

#[derive(Default)]
pub struct MemoryVectorStore {
    entries: RwLock<Vec<(StoredChunk, Vec<f32>)>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError> {
        // Single write-lock append keeps the batch atomic for readers.
        self.entries.write().await.extend(items);
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit.max(1));

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().await.len())
    }
}

//! VectorStore trait, the abstract interface for chunk storage backends.
//!
//! Two implementations share this contract: `SqliteVectorStore`
//! (persistent, survives restarts) and `MemoryVectorStore` (ephemeral,
//! rebuilt from the seed corpus at startup).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored chunk with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Origin identifier (URL or file path).
    pub source: String,
    /// Character offset within the original document.
    pub start_offset: usize,
    /// Position of this chunk within its document.
    pub chunk_index: usize,
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    /// Cosine similarity against the query embedding (higher = better).
    pub score: f32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embedding vectors. All-or-nothing:
    /// readers observe either none or all of the batch.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError>;

    /// Return up to `limit` chunks closest to the query embedding,
    /// ordered by descending score.
    async fn search(&self, query_embedding: &[f32], limit: usize)
        -> Result<Vec<ScoredChunk>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

//! Retrieval-augmented answering.
//!
//! Write path: document text -> `Chunker` -> `VectorIndex::insert`.
//! Read path: question -> greeting short-circuit -> `VectorIndex::search`
//! -> relevance filter -> prompt-constrained generation.

mod chunker;
mod greeting;
mod index;
mod memory;
mod pipeline;
mod sqlite;
mod store;

pub use chunker::Chunker;
pub use index::VectorIndex;
pub use memory::MemoryVectorStore;
pub use pipeline::{RagPipeline, GREETING_REPLY, REFUSAL};
pub use sqlite::SqliteVectorStore;
pub use store::{ScoredChunk, StoreError, StoredChunk, VectorStore};

use thiserror::Error;

use crate::llm::ProviderError;

/// Failure inside one pipeline invocation. Backend failures are kept
/// apart from the no-relevant-context outcome, which is not an error:
/// the pipeline answers it with the fixed refusal string.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("embedding backend: {0}")]
    EmbeddingBackend(#[source] ProviderError),
    #[error("generation backend: {0}")]
    GenerationBackend(#[source] ProviderError),
    #[error("vector store: {0}")]
    Store(#[from] StoreError),
}

use std::sync::Arc;

use crate::core::config::{AppPaths, IndexMode, Settings};
use crate::core::security::TokenStore;
use crate::ingest::Ingestor;
use crate::llm::OpenRouterProvider;
use crate::rag::{
    Chunker, MemoryVectorStore, RagPipeline, SqliteVectorStore, VectorIndex, VectorStore,
};
use crate::users::UserStore;

pub mod error;

use error::InitializationError;

/// Shared application state: configuration plus the pipeline and its
/// collaborators, constructed once at startup and injected everywhere.
/// No globals; test doubles slot in through the provider and store
/// traits.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub users: UserStore,
    pub tokens: TokenStore,
    pub pipeline: RagPipeline,
    pub ingestor: Ingestor,
}

impl AppState {
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let settings = Settings::load(&paths)?;

        let provider = Arc::new(
            OpenRouterProvider::new(&settings.provider)
                .map_err(InitializationError::Provider)?,
        );

        let store: Arc<dyn VectorStore> = match settings.index.mode {
            IndexMode::Sqlite => Arc::new(
                SqliteVectorStore::with_path(paths.index_db_path.clone())
                    .await
                    .map_err(|e| InitializationError::Index(e.into()))?,
            ),
            IndexMode::Memory => Arc::new(MemoryVectorStore::new()),
        };

        let index = VectorIndex::new(store, provider.clone());
        let chunker = Chunker::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )?;

        let pipeline = RagPipeline::new(
            index.clone(),
            provider,
            settings.retrieval.relevance_threshold,
            settings.retrieval.top_k,
        );
        let ingestor = Ingestor::new(index, chunker);

        let users = UserStore::with_path(paths.db_path.clone())
            .await
            .map_err(|e| InitializationError::Users(e.into()))?;

        let state = Arc::new(AppState {
            paths,
            settings,
            users,
            tokens: TokenStore::new(),
            pipeline,
            ingestor,
        });

        state.seed_index().await;

        Ok(state)
    }

    /// In memory mode the index starts empty on every boot, so the seed
    /// corpus is ingested here. A failing seed source is logged and
    /// skipped rather than aborting startup.
    async fn seed_index(&self) {
        if self.settings.index.mode != IndexMode::Memory {
            return;
        }

        for url in &self.settings.index.seed_urls {
            match self.ingestor.ingest(url).await {
                Ok(chunks) => tracing::info!("seeded {} chunks from {}", chunks, url),
                Err(err) => tracing::warn!("failed to seed index from {}: {}", url, err),
            }
        }
    }
}

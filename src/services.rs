//! Long-lived collaborators shared by the CLI commands and the HTTP server.
//!
//! The store, entity extractor, and embedding provider are each created
//! once and shared read-only behind `Arc`. Loading a local model is
//! expensive, so nothing in the request path constructs one.

use anyhow::Result;
use std::sync::Arc;

use knowmap_core::embedding::EmbeddingProvider;
use knowmap_core::entities::EntityExtractor;
use knowmap_core::store::Store;

use crate::config::Config;
use crate::embedding::create_provider;
use crate::entities::create_extractor;
use crate::sqlite_store::SqliteStore;

pub struct Services {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub extractor: Arc<dyn EntityExtractor>,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

impl Services {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        extractor: Arc<dyn EntityExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        if embedder.dims() != store.dims() {
            tracing::warn!(
                provider_dims = embedder.dims(),
                index_dims = store.dims(),
                "embedding provider and index disagree on dimensionality; uploads will be rejected"
            );
        }
        Self {
            config,
            store,
            extractor,
            embedder,
        }
    }

    /// Open the SQLite index and build the configured providers.
    pub async fn open(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(config).await?;
        let extractor = create_extractor(&config.entities)?;
        let embedder = create_provider(&config.embedding)?;
        tracing::debug!(
            extractor = extractor.name(),
            model = embedder.model_name(),
            dims = embedder.dims(),
            "services ready"
        );
        Ok(Self::new(config.clone(), Arc::new(store), extractor, embedder))
    }

    pub fn top_k(&self) -> usize {
        self.config.retrieval.top_k
    }
}

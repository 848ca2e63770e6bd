//! Server dependencies (using traits for testability)
//!
//! The single container the coordinator and HTTP layer draw their
//! collaborators from. Everything external sits behind a Base* trait.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::common::utils::{HashingEmbedder, OpenAiEmbeddingService};
use crate::config::{Config, EmbeddingProvider};
use crate::kernel::{
    BaseEmbeddingService, BaseMatchStore, BaseNotifier, InMemoryStore, LoggingNotifier,
    PostgresStore,
};

#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseMatchStore>,
    pub embedding_service: Arc<dyn BaseEmbeddingService>,
    pub notifier: Arc<dyn BaseNotifier>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseMatchStore>,
        embedding_service: Arc<dyn BaseEmbeddingService>,
        notifier: Arc<dyn BaseNotifier>,
    ) -> Self {
        Self {
            store,
            embedding_service,
            notifier,
        }
    }

    /// Build production dependencies from configuration.
    ///
    /// Connects and migrates Postgres when `DATABASE_URL` is set, otherwise
    /// keeps everything in memory.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn BaseMatchStore> = match &config.database_url {
            Some(url) => {
                info!("Using PostgreSQL store");
                let store = PostgresStore::connect(url).await?;
                store.migrate().await?;
                Arc::new(store)
            }
            None => {
                info!("DATABASE_URL not set, using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        };

        let embedding_service: Arc<dyn BaseEmbeddingService> = match config.embedding_provider {
            EmbeddingProvider::Hashing => {
                info!(dimensions = config.embedding_dimensions, "Using hashing embedder");
                Arc::new(HashingEmbedder::new(config.embedding_dimensions))
            }
            EmbeddingProvider::OpenAi => {
                let api_key = config
                    .openai_api_key
                    .clone()
                    .context("OPENAI_API_KEY is required when EMBEDDING_PROVIDER=openai")?;
                info!("Using OpenAI embeddings");
                Arc::new(OpenAiEmbeddingService::new(api_key))
            }
        };

        Ok(Self::new(store, embedding_service, Arc::new(LoggingNotifier)))
    }
}

//! Application state - shared across all handlers.

use std::sync::Arc;

use scribe_core::PostService;
use scribe_core::ports::PostStore;
use scribe_infra::{FilePostStore, InMemoryPostStore, SystemClock, UuidIdGenerator};

use crate::config::StoreConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
}

impl AppState {
    /// Build the application state around the configured post store.
    pub async fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn PostStore> = match config {
            StoreConfig::Memory => {
                tracing::warn!("Using in-memory post store. Posts are lost on restart.");
                Arc::new(InMemoryPostStore::new())
            }
            StoreConfig::File(file) => Arc::new(FilePostStore::open(file.clone()).await?),
            StoreConfig::Postgres(database) => postgres_store(database).await?,
        };

        tracing::info!("Application state initialized");
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn PostStore>) -> Self {
        let posts = PostService::new(store, Arc::new(SystemClock), Arc::new(UuidIdGenerator));
        Self {
            posts: Arc::new(posts),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryPostStore::new()))
    }
}

#[cfg(feature = "postgres")]
async fn postgres_store(
    database: &scribe_infra::DatabaseConfig,
) -> anyhow::Result<Arc<dyn PostStore>> {
    let db = scribe_infra::database::connect(database).await?;
    Ok(Arc::new(scribe_infra::PostgresPostStore::new(db)))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_store(
    _database: &scribe_infra::DatabaseConfig,
) -> anyhow::Result<Arc<dyn PostStore>> {
    tracing::warn!("Running without postgres feature - using in-memory post store");
    Ok(Arc::new(InMemoryPostStore::new()))
}

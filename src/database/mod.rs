pub mod memory;
pub mod models;
pub mod populate;
pub mod postgres;
pub mod repository;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::DatabaseConfig;

pub use memory::MemoryDocumentStore;
pub use populate::{populate, populate_one};
pub use postgres::PgDocumentStore;
pub use repository::{Document, Repository, Timestamps};
pub use store::{DocumentStore, StoreError};

pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Opens the backend named by `DATABASE_URL`
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if config.url.starts_with(MEMORY_URL_SCHEME) {
        info!("Using in-memory document store");
        return Ok(Arc::new(MemoryDocumentStore::new()));
    }
    Ok(Arc::new(PgDocumentStore::connect(config).await?))
}

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{Filter, FilterError};

/// Errors raised by document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key in {collection}: {field}")]
    DuplicateKey { collection: String, field: String },

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("malformed document in {collection}: {source}")]
    Malformed {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema-flexible collections of JSON documents keyed by UUID.
///
/// Writes are atomic per document only. Unique fields are declared per
/// collection through [`DocumentStore::ensure_collection`]; nothing else about
/// a document's shape is enforced here, references included.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the collection and its unique indexes if they do not exist yet
    async fn ensure_collection(&self, collection: &str, unique_fields: &[&str]) -> Result<(), StoreError>;

    async fn insert(&self, collection: &str, id: Uuid, document: Value) -> Result<(), StoreError>;

    /// Documents matching `filter`, in insertion order
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Documents whose id is in `ids`; unknown ids are skipped
    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Value>, StoreError>;

    /// Replaces the whole document. Returns `false` when no document has `id`.
    async fn replace(&self, collection: &str, id: Uuid, document: Value) -> Result<bool, StoreError>;

    /// Returns `false` when no document has `id`
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

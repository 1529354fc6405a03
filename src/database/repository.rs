use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::store::{DocumentStore, StoreError};
use crate::filter::Filter;

/// `createdAt` / `updatedAt` pair kept on every stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// A record kind that lives in its own collection
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> Uuid;
    fn timestamps_mut(&mut self) -> &mut Timestamps;
}

/// Typed access to one collection of a [`DocumentStore`]
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        self.store.ensure_collection(T::COLLECTION, T::UNIQUE_FIELDS).await
    }

    /// Stamps both timestamps and inserts the record
    pub async fn create(&self, mut document: T) -> Result<T, StoreError> {
        *document.timestamps_mut() = Timestamps::now();
        let value = serde_json::to_value(&document)?;
        self.store.insert(T::COLLECTION, document.id(), value).await?;
        Ok(document)
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let values = self.store.find(T::COLLECTION, filter).await?;
        values.into_iter().map(decode).collect()
    }

    pub async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        self.find(&Filter::new()).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError> {
        let values = self.store.find_by_ids(T::COLLECTION, ids).await?;
        values.into_iter().map(decode).collect()
    }

    /// Full-document replace on id, refreshing `updatedAt`.
    /// Returns `None` when the record no longer exists.
    pub async fn replace(&self, mut document: T) -> Result<Option<T>, StoreError> {
        document.timestamps_mut().updated_at = Utc::now();
        let value = serde_json::to_value(&document)?;
        if self.store.replace(T::COLLECTION, document.id(), value).await? {
            Ok(Some(document))
        } else {
            Ok(None)
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}

fn decode<T: Document>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Malformed {
        collection: T::COLLECTION.to_string(),
        source,
    })
}

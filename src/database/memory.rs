use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{DocumentStore, StoreError};
use crate::filter::{text_value, Filter};

#[derive(Default)]
struct Collection {
    unique_fields: Vec<String>,
    documents: Vec<(Uuid, Value)>,
}

impl Collection {
    /// First unique field on which `document` clashes with another document
    fn conflicting_field(&self, id: Uuid, document: &Value) -> Option<String> {
        self.unique_fields.iter().find_map(|field| {
            let candidate = document.get(field).and_then(text_value)?;
            self.documents
                .iter()
                .filter(|(other_id, _)| *other_id != id)
                .any(|(_, other)| other.get(field).and_then(text_value).as_deref() == Some(candidate.as_str()))
                .then(|| field.clone())
        })
    }
}

/// In-process document store with the same semantics as the Postgres backend.
/// Selected with `DATABASE_URL=memory://`; state is lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn duplicate(collection: &str, field: impl Into<String>) -> StoreError {
        StoreError::DuplicateKey {
            collection: collection.to_string(),
            field: field.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ensure_collection(&self, collection: &str, unique_fields: &[&str]) -> Result<(), StoreError> {
        Filter::validate_collection(collection)?;
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        for field in unique_fields {
            if !entry.unique_fields.iter().any(|f| f == field) {
                entry.unique_fields.push(field.to_string());
            }
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, id: Uuid, document: Value) -> Result<(), StoreError> {
        Filter::validate_collection(collection)?;
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        if entry.documents.iter().any(|(existing, _)| *existing == id) {
            return Err(Self::duplicate(collection, "_id"));
        }
        if let Some(field) = entry.conflicting_field(id, &document) {
            return Err(Self::duplicate(collection, field));
        }
        entry.documents.push((id, document));
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        // Same validation the SQL rendering applies
        filter.to_sql(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| {
            c.documents
                .iter()
                .find(|(existing, _)| *existing == id)
                .map(|(_, doc)| doc.clone())
        }))
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|(id, _)| ids.contains(id))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: Uuid, document: Value) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(false);
        };
        if !entry.documents.iter().any(|(existing, _)| *existing == id) {
            return Ok(false);
        }
        if let Some(field) = entry.conflicting_field(id, &document) {
            return Err(Self::duplicate(collection, field));
        }
        if let Some(slot) = entry.documents.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = document;
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = entry.documents.len();
        entry.documents.retain(|(existing, _)| *existing != id);
        Ok(entry.documents.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn crud_round_trip_preserves_insertion_order() {
        let store = MemoryDocumentStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert("pets", a, json!({"name": "Rex"})).await.unwrap();
        store.insert("pets", b, json!({"name": "Tom"})).await.unwrap();

        let all = store.find("pets", &Filter::new()).await.unwrap();
        assert_eq!(all, vec![json!({"name": "Rex"}), json!({"name": "Tom"})]);

        assert!(store.replace("pets", a, json!({"name": "Max"})).await.unwrap());
        assert_eq!(store.find_by_id("pets", a).await.unwrap(), Some(json!({"name": "Max"})));

        assert!(store.delete("pets", a).await.unwrap());
        assert!(!store.delete("pets", a).await.unwrap());
        assert_eq!(store.find_by_id("pets", a).await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_of_missing_document_reports_false() {
        let store = MemoryDocumentStore::new();
        assert!(!store.replace("pets", Uuid::new_v4(), json!({})).await.unwrap());
    }

    #[tokio::test]
    async fn unique_fields_reject_second_insert() {
        let store = MemoryDocumentStore::new();
        store.ensure_collection("users", &["email"]).await.unwrap();
        store
            .insert("users", Uuid::new_v4(), json!({"email": "a@b.c"}))
            .await
            .unwrap();
        let err = store
            .insert("users", Uuid::new_v4(), json!({"email": "a@b.c"}))
            .await
            .unwrap_err();
        match err {
            StoreError::DuplicateKey { collection, field } => {
                assert_eq!(collection, "users");
                assert_eq!(field, "email");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Uniqueness is exact: a different case is a different key
        store
            .insert("users", Uuid::new_v4(), json!({"email": "A@b.c"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn replace_may_keep_its_own_unique_value() {
        let store = MemoryDocumentStore::new();
        store.ensure_collection("users", &["email"]).await.unwrap();
        let id = Uuid::new_v4();
        store.insert("users", id, json!({"email": "a@b.c", "n": 1})).await.unwrap();
        assert!(store
            .replace("users", id, json!({"email": "a@b.c", "n": 2}))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn find_by_ids_skips_unknown_ids() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.insert("shelters", id, json!({"name": "Happy Paws"})).await.unwrap();
        let found = store
            .find_by_ids("shelters", &[id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn find_filters_by_field_equality() {
        let store = MemoryDocumentStore::new();
        store.insert("pets", Uuid::new_v4(), json!({"species": "Dog", "size": "Large"})).await.unwrap();
        store.insert("pets", Uuid::new_v4(), json!({"species": "Dog", "size": "Small"})).await.unwrap();
        store.insert("pets", Uuid::new_v4(), json!({"species": "Cat", "size": "Small"})).await.unwrap();

        let dogs = store.find("pets", &Filter::new().eq("species", "Dog")).await.unwrap();
        assert_eq!(dogs.len(), 2);

        let small_dogs = store
            .find("pets", &Filter::new().eq("species", "Dog").eq("size", "Small"))
            .await
            .unwrap();
        assert_eq!(small_dogs, vec![json!({"species": "Dog", "size": "Small"})]);
    }
}

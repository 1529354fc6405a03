use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use super::repository::{Document, Repository};
use super::store::StoreError;

/// Reference expansion: serializes each document and replaces `field` with
/// the referenced document, or `null` when the reference is unset or dangling.
/// All distinct references are resolved with a single lookup.
pub async fn populate<T, R, F>(
    documents: Vec<T>,
    field: &str,
    references: &Repository<R>,
    key: F,
) -> Result<Vec<Value>, StoreError>
where
    T: Document,
    R: Document,
    F: Fn(&T) -> Option<Uuid>,
{
    let mut ids: Vec<Uuid> = documents.iter().filter_map(&key).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut resolved: HashMap<Uuid, Value> = HashMap::with_capacity(ids.len());
    if !ids.is_empty() {
        for referenced in references.find_by_ids(&ids).await? {
            resolved.insert(referenced.id(), serde_json::to_value(&referenced)?);
        }
    }

    documents
        .into_iter()
        .map(|document| {
            let expanded = key(&document)
                .and_then(|id| resolved.get(&id).cloned())
                .unwrap_or(Value::Null);
            let mut value = serde_json::to_value(&document)?;
            if let Value::Object(map) = &mut value {
                map.insert(field.to_string(), expanded);
            }
            Ok(value)
        })
        .collect()
}

pub async fn populate_one<T, R, F>(
    document: T,
    field: &str,
    references: &Repository<R>,
    key: F,
) -> Result<Value, StoreError>
where
    T: Document,
    R: Document,
    F: Fn(&T) -> Option<Uuid>,
{
    let mut values = populate(vec![document], field, references, key).await?;
    Ok(values.pop().unwrap_or(Value::Null))
}

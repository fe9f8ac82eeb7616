//! Ancestor-keyed entity datastore.
//!
//! # Design
//! Entities are property maps addressed by hierarchical `Key`s. A key with id
//! 0 is incomplete; `put` allocates an id for it. Queries select one kind,
//! optionally restricted to descendants of an ancestor key and to entities
//! whose properties equal given values. Results come back in key order.
//!
//! Implementations must make ancestor queries strongly consistent: a query
//! issued after a write has returned observes that write. `LocalDatastore`
//! satisfies this trivially by serializing all access through one lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

/// Property values of a single entity.
pub type Properties = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("datastore: no such entity")]
    NoSuchEntity,

    #[error("datastore: incomplete key {0} used where a complete key is required")]
    IncompleteKey(Key),

    #[error("datastore: invalid entity: {0}")]
    InvalidEntity(String),
}

/// Hierarchical entity key.
///
/// Field order matters: keys sort by parent path first, so the children of
/// one ancestor are contiguous and ordered by id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    parent: Option<Box<Key>>,
    kind: String,
    id: i64,
}

impl Key {
    pub fn new(kind: impl Into<String>, id: i64, parent: Option<&Key>) -> Self {
        Self {
            parent: parent.map(|p| Box::new(p.clone())),
            kind: kind.into(),
            id,
        }
    }

    /// A key whose id is allocated by the datastore on `put`.
    pub fn incomplete(kind: impl Into<String>, parent: Option<&Key>) -> Self {
        Self::new(kind, 0, parent)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    pub fn is_incomplete(&self) -> bool {
        self.id == 0
    }

    /// True if `ancestor` is a strict ancestor of this key.
    pub fn has_ancestor(&self, ancestor: &Key) -> bool {
        let mut current = self.parent();
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = key.parent();
        }
        false
    }

    fn check_complete(&self) -> Result<(), DatastoreError> {
        let mut current = Some(self);
        while let Some(key) = current {
            if key.is_incomplete() {
                return Err(DatastoreError::IncompleteKey(self.clone()));
            }
            current = key.parent();
        }
        Ok(())
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Query over one entity kind.
#[derive(Debug, Clone)]
pub struct Query {
    kind: String,
    ancestor: Option<Key>,
    filters: Vec<(String, Value)>,
}

impl Query {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ancestor: None,
            filters: Vec::new(),
        }
    }

    /// Restrict results to descendants of `key`.
    pub fn ancestor(mut self, key: &Key) -> Self {
        self.ancestor = Some(key.clone());
        self
    }

    /// Keep only entities whose `property` equals `value`.
    pub fn filter(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((property.into(), value.into()));
        self
    }

    fn matches(&self, key: &Key, properties: &Properties) -> bool {
        key.kind == self.kind
            && self.ancestor.as_ref().map_or(true, |a| key.has_ancestor(a))
            && self
                .filters
                .iter()
                .all(|(name, value)| properties.get(name) == Some(value))
    }
}

/// Key/value and query primitives of an entity datastore.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Store `properties` under `key`, allocating an id if the key is
    /// incomplete. Returns the complete key.
    async fn put(&self, key: Key, properties: Properties) -> Result<Key, DatastoreError>;

    /// Replace the entity stored under `key`. Fails with `NoSuchEntity`,
    /// writing nothing, when the key holds no entity.
    async fn update(&self, key: &Key, properties: Properties) -> Result<(), DatastoreError>;

    async fn get(&self, key: &Key) -> Result<Properties, DatastoreError>;

    /// Fails with `NoSuchEntity` when nothing is stored under `key`.
    async fn delete(&self, key: &Key) -> Result<(), DatastoreError>;

    /// Delete every key in `keys`; keys with no entity are skipped.
    async fn delete_multi(&self, keys: &[Key]) -> Result<(), DatastoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<(Key, Properties)>, DatastoreError>;

    async fn query_keys(&self, query: &Query) -> Result<Vec<Key>, DatastoreError>;
}

/// In-process datastore backed by an ordered map.
#[derive(Debug, Default)]
pub struct LocalDatastore {
    inner: RwLock<Entities>,
}

#[derive(Debug, Default)]
struct Entities {
    last_id: i64,
    rows: BTreeMap<Key, Properties>,
}

impl LocalDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for LocalDatastore {
    async fn put(&self, mut key: Key, properties: Properties) -> Result<Key, DatastoreError> {
        if let Some(parent) = key.parent() {
            parent.check_complete()?;
        }
        let mut inner = self.inner.write().await;
        if key.is_incomplete() {
            inner.last_id += 1;
            key.id = inner.last_id;
        }
        inner.rows.insert(key.clone(), properties);
        Ok(key)
    }

    async fn update(&self, key: &Key, properties: Properties) -> Result<(), DatastoreError> {
        key.check_complete()?;
        let mut inner = self.inner.write().await;
        let slot = inner
            .rows
            .get_mut(key)
            .ok_or(DatastoreError::NoSuchEntity)?;
        *slot = properties;
        Ok(())
    }

    async fn get(&self, key: &Key) -> Result<Properties, DatastoreError> {
        key.check_complete()?;
        self.inner
            .read()
            .await
            .rows
            .get(key)
            .cloned()
            .ok_or(DatastoreError::NoSuchEntity)
    }

    async fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        key.check_complete()?;
        self.inner
            .write()
            .await
            .rows
            .remove(key)
            .map(|_| ())
            .ok_or(DatastoreError::NoSuchEntity)
    }

    async fn delete_multi(&self, keys: &[Key]) -> Result<(), DatastoreError> {
        for key in keys {
            key.check_complete()?;
        }
        let mut inner = self.inner.write().await;
        for key in keys {
            inner.rows.remove(key);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<(Key, Properties)>, DatastoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|(key, properties)| query.matches(key, properties))
            .map(|(key, properties)| (key.clone(), properties.clone()))
            .collect())
    }

    async fn query_keys(&self, query: &Query) -> Result<Vec<Key>, DatastoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|(key, properties)| query.matches(key, properties))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn group() -> Key {
        Key::new("Group", 1, None)
    }

    #[tokio::test]
    async fn put_allocates_ids_for_incomplete_keys() {
        let ds = LocalDatastore::new();
        let a = ds
            .put(Key::incomplete("Item", Some(&group())), props(json!({"n": 1})))
            .await
            .unwrap();
        let b = ds
            .put(Key::incomplete("Item", Some(&group())), props(json!({"n": 2})))
            .await
            .unwrap();
        assert!(!a.is_incomplete());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.parent(), Some(&group()));
        assert_eq!(ds.get(&a).await.unwrap()["n"], 1);
    }

    #[tokio::test]
    async fn put_rejects_incomplete_parent() {
        let ds = LocalDatastore::new();
        let parent = Key::incomplete("Group", None);
        let err = ds
            .put(Key::incomplete("Item", Some(&parent)), Properties::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DatastoreError::IncompleteKey(_)));
    }

    #[tokio::test]
    async fn get_and_delete_missing_key() {
        let ds = LocalDatastore::new();
        let key = Key::new("Item", 9, Some(&group()));
        assert!(matches!(ds.get(&key).await, Err(DatastoreError::NoSuchEntity)));
        assert!(matches!(ds.delete(&key).await, Err(DatastoreError::NoSuchEntity)));
    }

    #[tokio::test]
    async fn ancestor_query_filters_by_group_kind_and_property() {
        let ds = LocalDatastore::new();
        let other = Key::new("Group", 2, None);
        ds.put(Key::incomplete("Item", Some(&group())), props(json!({"done": true})))
            .await
            .unwrap();
        ds.put(Key::incomplete("Item", Some(&group())), props(json!({"done": false})))
            .await
            .unwrap();
        ds.put(Key::incomplete("Item", Some(&other)), props(json!({"done": true})))
            .await
            .unwrap();
        ds.put(Key::incomplete("Note", Some(&group())), props(json!({"done": true})))
            .await
            .unwrap();

        let all = ds
            .query(&Query::new("Item").ancestor(&group()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].0.id() < all[1].0.id());

        let done = ds
            .query_keys(&Query::new("Item").ancestor(&group()).filter("done", true))
            .await
            .unwrap();
        assert_eq!(done, vec![all[0].0.clone()]);
    }

    #[tokio::test]
    async fn update_replaces_only_existing_entities() {
        let ds = LocalDatastore::new();
        let key = ds
            .put(Key::incomplete("Item", Some(&group())), props(json!({"n": 1})))
            .await
            .unwrap();
        ds.update(&key, props(json!({"n": 2}))).await.unwrap();
        assert_eq!(ds.get(&key).await.unwrap()["n"], 2);

        ds.delete(&key).await.unwrap();
        let err = ds.update(&key, props(json!({"n": 3}))).await.unwrap_err();
        assert!(matches!(err, DatastoreError::NoSuchEntity));
        assert!(matches!(ds.get(&key).await, Err(DatastoreError::NoSuchEntity)));
        assert!(ds.query(&Query::new("Item")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_multi_skips_missing_keys() {
        let ds = LocalDatastore::new();
        let kept = ds
            .put(Key::incomplete("Item", Some(&group())), Properties::new())
            .await
            .unwrap();
        let gone = ds
            .put(Key::incomplete("Item", Some(&group())), Properties::new())
            .await
            .unwrap();
        let missing = Key::new("Item", 999, Some(&group()));

        ds.delete_multi(&[gone.clone(), missing]).await.unwrap();

        assert!(ds.get(&kept).await.is_ok());
        assert!(matches!(ds.get(&gone).await, Err(DatastoreError::NoSuchEntity)));
    }

    #[test]
    fn key_display_includes_ancestors() {
        let key = Key::new("Item", 3, Some(&group()));
        assert_eq!(key.to_string(), "Group/1/Item/3");
        assert!(key.has_ancestor(&group()));
        assert!(!group().has_ancestor(&key));
    }
}

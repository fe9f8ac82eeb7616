use async_trait::async_trait;
use serde_json::Value;

use super::TodoStore;
use crate::datastore::{Datastore, DatastoreError, Key, Properties, Query};
use crate::error::StoreError;
use crate::todo::{Todo, TodoId};

pub use crate::datastore::LocalDatastore;

const GROUP_KIND: &str = "TodoGroup";
const TODO_KIND: &str = "Todo";

/// Todo store on top of a `Datastore`.
///
/// Every todo is a child of the single `TodoGroup/1` key and every read is an
/// ancestor query or a lookup by full key, so reads observe all completed
/// writes.
#[derive(Debug)]
pub struct DatastoreStore<D> {
    datastore: D,
    group: Key,
}

impl<D: Datastore> DatastoreStore<D> {
    pub fn new(datastore: D) -> Self {
        Self {
            datastore,
            group: Key::new(GROUP_KIND, 1, None),
        }
    }

    /// Key of the todo `id`. Id 0 would be an incomplete key, which never
    /// names a stored entity.
    fn key(&self, id: TodoId) -> Result<Key, StoreError> {
        if id == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(Key::new(TODO_KIND, id, Some(&self.group)))
    }

    fn query(&self) -> Query {
        Query::new(TODO_KIND).ancestor(&self.group)
    }
}

impl From<DatastoreError> for StoreError {
    fn from(err: DatastoreError) -> Self {
        match err {
            DatastoreError::NoSuchEntity => StoreError::NotFound,
            other => StoreError::Backend(other.into()),
        }
    }
}

fn to_properties(todo: &Todo) -> Properties {
    let mut properties = Properties::new();
    properties.insert("title".to_string(), Value::from(todo.title.clone()));
    properties.insert("completed".to_string(), Value::from(todo.completed));
    properties
}

fn from_entity(key: &Key, properties: &Properties) -> Result<Todo, DatastoreError> {
    let title = properties
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| DatastoreError::InvalidEntity(format!("{key}: missing title")))?;
    let completed = properties
        .get("completed")
        .and_then(Value::as_bool)
        .ok_or_else(|| DatastoreError::InvalidEntity(format!("{key}: missing completed")))?;

    Ok(Todo {
        id: Some(key.id()),
        title: title.to_string(),
        completed,
    })
}

#[async_trait]
impl<D: Datastore> TodoStore for DatastoreStore<D> {
    async fn save(&self, mut todo: Todo) -> Result<Todo, StoreError> {
        todo.validate()?;
        match todo.id {
            None => {
                let key = Key::incomplete(TODO_KIND, Some(&self.group));
                let key = self.datastore.put(key, to_properties(&todo)).await?;
                todo.id = Some(key.id());
            }
            Some(id) => {
                let key = self.key(id)?;
                self.datastore.update(&key, to_properties(&todo)).await?;
            }
        }
        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let entities = self.datastore.query(&self.query()).await?;
        let todos = entities
            .iter()
            .map(|(key, properties)| from_entity(key, properties))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    async fn get(&self, id: TodoId) -> Result<Todo, StoreError> {
        let key = self.key(id)?;
        let properties = self.datastore.get(&key).await?;
        Ok(from_entity(&key, &properties)?)
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        self.datastore.delete(&self.key(id)?).await?;
        Ok(())
    }

    async fn delete_completed(&self) -> Result<(), StoreError> {
        let keys = self
            .datastore
            .query_keys(&self.query().filter("completed", true))
            .await?;
        tracing::debug!(count = keys.len(), "deleting completed todos");
        self.datastore.delete_multi(&keys).await?;
        Ok(())
    }
}

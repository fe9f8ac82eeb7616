use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::todo::{Todo, TodoId};

/// In-memory store. Todos are kept in insertion order; ids come from a
/// counter starting at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: TodoId,
    todos: Vec<Todo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn save(&self, mut todo: Todo) -> Result<Todo, StoreError> {
        todo.validate()?;
        let mut inner = self.inner.write().await;

        match todo.id {
            None => {
                inner.last_id += 1;
                todo.id = Some(inner.last_id);
                inner.todos.push(todo.clone());
            }
            Some(id) => {
                let slot = inner
                    .todos
                    .iter_mut()
                    .find(|t| t.id == Some(id))
                    .ok_or(StoreError::NotFound)?;
                *slot = todo.clone();
            }
        }
        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.inner.read().await.todos.clone())
    }

    async fn get(&self, id: TodoId) -> Result<Todo, StoreError> {
        let inner = self.inner.read().await;
        inner
            .todos
            .iter()
            .find(|t| t.id == Some(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: TodoId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let pos = inner
            .todos
            .iter()
            .position(|t| t.id == Some(id))
            .ok_or(StoreError::NotFound)?;
        inner.todos.remove(pos);
        Ok(())
    }

    async fn delete_completed(&self) -> Result<(), StoreError> {
        self.inner.write().await.todos.retain(|t| !t.completed);
        Ok(())
    }
}

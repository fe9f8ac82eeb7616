//! Todo persistence.
//!
//! `TodoStore` is the seam between the HTTP handlers and storage. Two
//! implementations exist: `MemoryStore`, a lock-guarded vector, and
//! `DatastoreStore`, which keeps todos as children of a single ancestor key in
//! a `Datastore` so that every read is strongly consistent.

pub mod datastore;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Backend, StorageConfig};
use crate::error::StoreError;
use crate::todo::{Todo, TodoId};

pub use datastore::{DatastoreStore, LocalDatastore};
pub use memory::MemoryStore;

/// Storage operations over todos.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist `todo`. A new todo gets a fresh id; an existing one replaces
    /// the stored record with the same id, or fails with `NotFound`.
    async fn save(&self, todo: Todo) -> Result<Todo, StoreError>;

    /// Every saved todo, in the backend's natural order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get(&self, id: TodoId) -> Result<Todo, StoreError>;

    async fn delete(&self, id: TodoId) -> Result<(), StoreError>;

    /// Remove every todo marked completed.
    async fn delete_completed(&self) -> Result<(), StoreError>;
}

/// Store handle shared by all request handlers.
pub type SharedStore = Arc<dyn TodoStore>;

/// Build the store selected by configuration.
pub fn from_config(config: &StorageConfig) -> SharedStore {
    match config.backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Datastore => Arc::new(DatastoreStore::new(LocalDatastore::new())),
    }
}

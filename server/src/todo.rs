//! The todo record shared by the store and the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Store-assigned identifier of a todo.
pub type TodoId = i64;

/// A single todo item.
///
/// `id` is `None` until the record has been saved once; after that it never
/// changes. On the wire the id is optional so that an update body may omit
/// it and inherit the id from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Build a new, unsaved todo. Empty titles are rejected.
    pub fn new(title: impl Into<String>) -> Result<Self, StoreError> {
        let todo = Self {
            id: None,
            title: title.into(),
            completed: false,
        };
        todo.validate()?;
        Ok(todo)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        Ok(())
    }
}

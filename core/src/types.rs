//! Wire types of the todo API.

use serde::{Deserialize, Serialize};

/// A todo as returned by the server. Saved todos always carry an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// POST body for creating a todo. The server reads nothing but the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

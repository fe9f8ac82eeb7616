//! HTTP handlers for the todo API.
//!
//! Each handler parses its inputs, calls exactly one store operation and maps
//! the outcome to a response. Malformed input never reaches the store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::store::SharedStore;
use crate::todo::{Todo, TodoId};

/// POST body. Only the title is read; anything else is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
}

fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid todo id {raw:?}: {e}")))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Liveness probe: 200 means the API is enabled.
pub async fn api_enabled() -> StatusCode {
    StatusCode::OK
}

pub async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(store.list().await?))
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = json_body(payload)?;
    let todo = Todo::new(input.title)?;
    tracing::info!(title = %todo.title, "saving new todo");
    let saved = store.save(todo).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete_completed_todos(
    State(store): State<SharedStore>,
) -> Result<StatusCode, ApiError> {
    store.delete_completed().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&raw_id)?;
    tracing::debug!(id, "looking up todo");
    Ok(Json(store.get(id).await?))
}

/// Replace the todo at `id` with the body. A body without an id takes the
/// path id; a different id is rejected.
pub async fn update_todo(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Todo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&raw_id)?;
    let mut todo = json_body(payload)?;
    match todo.id {
        None => todo.id = Some(id),
        Some(body_id) if body_id != id => {
            return Err(ApiError::BadRequest("inconsistent todo IDs".to_string()));
        }
        Some(_) => {}
    }
    todo.validate()?;

    let saved = store.save(todo).await.inspect_err(|err| {
        tracing::info!(id, error = %err, "unable to update todo");
    })?;
    Ok(Json(saved))
}

pub async fn delete_todo(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    tracing::info!(id, "deleting todo");
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

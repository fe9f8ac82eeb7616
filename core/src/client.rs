//! Stateless request builder and response parser for the todo API.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo};

/// Client for a todo server rooted at `base_url`.
///
/// `build_*` methods describe a request; the caller executes it and feeds the
/// response to the matching `parse_*` method.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }

    pub fn build_api_enabled(&self) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, format!("{}/api", self.base_url))
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.todos_url())
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(ApiError::Serialization)?;
        Ok(HttpRequest::json(HttpMethod::Post, self.todos_url(), body))
    }

    pub fn build_delete_completed(&self) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Delete, self.todos_url())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.todo_url(id))
    }

    /// Full replacement of the todo at `todo.id`.
    pub fn build_update_todo(&self, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(todo).map_err(ApiError::Serialization)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.todo_url(todo.id), body))
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Delete, self.todo_url(id))
    }

    pub fn parse_api_enabled(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_delete_completed(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}

fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_and_delete_completed_share_the_collection_url() {
        let list = client().build_list_todos();
        let purge = client().build_delete_completed();
        assert_eq!(list.method, HttpMethod::Get);
        assert_eq!(purge.method, HttpMethod::Delete);
        assert_eq!(list.url, "http://localhost:3000/api/todos");
        assert_eq!(purge.url, list.url);
        assert!(list.body.is_none() && list.headers.is_empty());
    }

    #[test]
    fn build_create_todo_sends_only_the_title() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk"}));
    }

    #[test]
    fn build_update_todo_targets_the_todo_id() {
        let todo = Todo {
            id: 7,
            title: "Learn Rust".to_string(),
            completed: true,
        };
        let req = client().build_update_todo(&todo).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/api/todos/7");
        let body: Todo = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, todo);
    }

    #[test]
    fn build_api_enabled_hits_the_api_root() {
        let req = client().build_api_enabled();
        assert_eq!(req.url, "http://localhost:3000/api");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = TodoClient::new("http://localhost:3000/").build_get_todo(1);
        assert_eq!(req.url, "http://localhost:3000/api/todos/1");
    }

    #[test]
    fn parse_create_todo_success() {
        let todo = client()
            .parse_create_todo(response(
                201,
                r#"{"id":1,"title":"Buy milk","completed":false}"#,
            ))
            .unwrap();
        assert_eq!(todo.id, 1);
        assert!(!todo.completed);
    }

    #[test]
    fn parse_get_todo_not_found() {
        let err = client()
            .parse_get_todo(response(404, r#"{"error":"todo not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_update_todo_bad_request_keeps_body() {
        let err = client()
            .parse_update_todo(response(400, r#"{"error":"inconsistent todo IDs"}"#))
            .unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("inconsistent todo IDs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_delete_statuses() {
        assert!(client().parse_delete_todo(response(204, "")).is_ok());
        assert!(client().parse_delete_completed(response(204, "")).is_ok());
        assert!(matches!(
            client().parse_delete_completed(response(500, "")),
            Err(ApiError::Http { status: 500, .. })
        ));
    }
}

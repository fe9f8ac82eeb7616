//! Client core for the todo REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller performs the round-trip, so the crate
//! carries no HTTP client and no async runtime.
//!
//! # Design
//! - `TodoClient` holds only the base URL.
//! - Every operation is a `build_*` / `parse_*` pair.
//! - DTOs are defined here rather than imported from the server crate; the
//!   end-to-end test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo};

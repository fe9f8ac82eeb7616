//! REST service managing a list of todos.
//!
//! # Overview
//! `app` wires the routes below to handlers over a `SharedStore`; `run`
//! serves that router until the process receives SIGINT or SIGTERM.
//!
//! | Method | Path              | Action                  |
//! |--------|-------------------|-------------------------|
//! | GET    | `/api`            | liveness probe          |
//! | GET    | `/api/todos`      | list every todo         |
//! | POST   | `/api/todos`      | create from a title     |
//! | DELETE | `/api/todos`      | delete completed todos  |
//! | GET    | `/api/todos/{id}` | fetch one todo          |
//! | PUT    | `/api/todos/{id}` | replace one todo        |
//! | DELETE | `/api/todos/{id}` | delete one todo         |

pub mod config;
pub mod datastore;
pub mod error;
pub mod handlers;
pub mod store;
pub mod todo;

use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, StoreError};
pub use store::{SharedStore, TodoStore};
pub use todo::{Todo, TodoId};

use handlers::{
    api_enabled, create_todo, delete_completed_todos, delete_todo, get_todo, list_todos,
    update_todo,
};

pub const PATH_PREFIX: &str = "/api/todos";

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/api", get(api_enabled))
        .route(
            PATH_PREFIX,
            get(list_todos)
                .post(create_todo)
                .delete(delete_completed_todos),
        )
        .route(
            &format!("{PATH_PREFIX}/{{id}}"),
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

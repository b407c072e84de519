//! HTTP front end: routes, handlers, and server startup.
//!
//! Every response body is a JSON envelope. Refusals carry
//! `{"success": false, "message": ...}` with a 4xx status so clients can
//! classify by either.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use taskdeck_proto::{AckResponse, ListResponse, NewTask, StatusUpdate, TaskId, TaskResponse};

use crate::book::{BookError, TaskBook};

/// Shared server state.
pub struct ServerState {
    /// Task storage.
    pub book: TaskBook,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// State with an empty book and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            book: TaskBook::new(),
        }
    }

    /// State with a custom title length limit.
    #[must_use]
    pub fn with_config(max_title_len: usize) -> Self {
        Self {
            book: TaskBook::with_max_title_len(max_title_len),
        }
    }
}

/// Builds the axum router over `state`.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    axum::Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .with_state(state)
}

/// Starts the server with an empty book.
///
/// Binds to the given address and spawns the server as a background tokio
/// task. Returns the actual bound address (useful when binding to port 0)
/// and a [`tokio::task::JoinHandle`] for the server task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    start_server_with_state(addr, Arc::new(ServerState::new())).await
}

/// Starts the server with a pre-configured [`ServerState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

const fn status_for(error: &BookError) -> StatusCode {
    match error {
        BookError::TitleEmpty | BookError::TitleTooLong { .. } => StatusCode::BAD_REQUEST,
        BookError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn parse_id(raw: &str) -> TaskId {
    let Ok(id) = raw.parse::<TaskId>();
    id
}

async fn list_tasks(State(state): State<Arc<ServerState>>) -> Json<ListResponse> {
    let tasks = state.book.list().await;
    tracing::debug!(count = tasks.len(), "listing tasks");
    Json(ListResponse::ok(tasks))
}

async fn create_task(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Response {
    let Json(new_task) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "invalid create body");
            return (
                rejection.status(),
                Json(TaskResponse::failure(rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.book.create(new_task).await {
        Ok(task) => {
            tracing::info!(task_id = %task.id, "task created");
            (StatusCode::CREATED, Json(TaskResponse::ok(task))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "create refused");
            (status_for(&e), Json(TaskResponse::failure(e.to_string()))).into_response()
        }
    }
}

async fn update_task(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(task_id = %raw_id, error = %rejection, "invalid update body");
            return (
                rejection.status(),
                Json(TaskResponse::failure(rejection.body_text())),
            )
                .into_response();
        }
    };

    let id = parse_id(&raw_id);
    match state.book.set_status(&id, update.status).await {
        Ok(task) => {
            tracing::info!(task_id = %id, status = %update.status, "task updated");
            Json(TaskResponse::ok(task)).into_response()
        }
        Err(e) => {
            tracing::warn!(task_id = %id, error = %e, "update refused");
            (status_for(&e), Json(TaskResponse::failure(e.to_string()))).into_response()
        }
    }
}

async fn delete_task(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = parse_id(&raw_id);
    match state.book.remove(&id).await {
        Ok(()) => {
            tracing::info!(task_id = %id, "task deleted");
            Json(AckResponse::ok()).into_response()
        }
        Err(e) => {
            tracing::warn!(task_id = %id, error = %e, "delete refused");
            (status_for(&e), Json(AckResponse::failure(e.to_string()))).into_response()
        }
    }
}

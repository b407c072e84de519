//! Integration tests for the HTTP remote.
//!
//! Runs `TaskStore<HttpRemote>` against the reference server on an
//! OS-assigned port, plus small ad-hoc axum routers for misbehaving
//! services.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use serde_json::json;
use taskdeck::remote::{HttpRemote, RemoteError, RemoteSettings, TaskRemote};
use taskdeck::tasks::{Outcome, TaskStore};
use taskdeck_proto::{NewTask, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn remote_for(base_url: String) -> HttpRemote {
    HttpRemote::new(&RemoteSettings {
        base_url,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
    })
    .expect("valid remote settings")
}

async fn start_reference_server() -> HttpRemote {
    let (addr, _handle) = taskdeck_server::server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start task server");
    remote_for(format!("http://{addr}"))
}

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// ---------------------------------------------------------------------------
// Against the reference server
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_session_over_http() {
    let store = TaskStore::open(start_reference_server().await).await;
    assert!(store.tasks().is_empty());
    assert_eq!(store.last_error(), None);

    assert_eq!(store.create("Buy milk", "").await, Outcome::Applied);
    assert_eq!(
        store.create("Call plumber", "kitchen sink").await,
        Outcome::Applied
    );
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description, None);
    assert_eq!(tasks[1].description.as_deref(), Some("kitchen sink"));

    let first = tasks[0].id.clone();
    assert_eq!(store.toggle(&first).await, Outcome::Applied);
    assert!(store.get(&first).unwrap().is_completed());

    assert_eq!(store.remove(&first).await, Outcome::Applied);
    assert_eq!(store.tasks().len(), 1);

    // A fresh store sees exactly what the service holds.
    let other = TaskStore::open(store.remote().clone()).await;
    assert_eq!(other.tasks(), store.tasks());
}

#[tokio::test]
async fn server_rejection_is_an_envelope_failure() {
    let store = TaskStore::open(start_reference_server().await).await;

    let outcome = store
        .set_status(&TaskId::from(404), TaskStatus::Completed)
        .await;
    assert!(matches!(outcome, Outcome::Failed(e) if e.to_string() == "Failed to update task"));

    let outcome = store.remove(&TaskId::from("nope")).await;
    assert!(matches!(outcome, Outcome::Failed(e) if e.to_string() == "Failed to delete task"));
}

#[tokio::test]
async fn blank_title_rejected_by_server_when_sent_directly() {
    let remote = start_reference_server().await;
    let err = remote.create(&NewTask::new(" ", "")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { message: Some(ref m) } if m == "title is required"));
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let store = TaskStore::open(remote_for(format!("http://{addr}"))).await;

    assert!(store.tasks().is_empty());
    assert_eq!(
        store.last_error().unwrap().to_string(),
        "Error connecting to API"
    );
    assert!(!store.is_busy());

    let outcome = store.create("A", "").await;
    assert!(matches!(outcome, Outcome::Failed(e) if e.to_string() == "Error creating task"));
}

#[tokio::test]
async fn non_envelope_body_is_a_transport_failure() {
    let app = axum::Router::new().route("/tasks", get(|| async { "<html>oops</html>" }));
    let remote = remote_for(format!("http://{}", serve(app).await));

    let err = remote.list().await.unwrap_err();
    assert!(matches!(err, RemoteError::Malformed(_)));

    let store = TaskStore::open(remote).await;
    assert_eq!(
        store.last_error().unwrap().to_string(),
        "Error connecting to API"
    );
}

#[tokio::test]
async fn list_with_non_rfc3339_created_at_succeeds() {
    let app = axum::Router::new().route(
        "/tasks",
        get(|| async {
            Json(json!({
                "success": true,
                "tasks": [
                    { "id": 1, "title": "A", "status": "pending", "createdAt": "2024-05-01T12:00:00" },
                    { "id": 2, "title": "B", "status": "pending", "createdAt": 1_714_564_800_000_i64 },
                ]
            }))
        }),
    );
    let store = TaskStore::open(remote_for(format!("http://{}", serve(app).await))).await;

    assert_eq!(store.last_error(), None);
    assert_eq!(store.tasks().len(), 2);
}

#[tokio::test]
async fn success_without_payload_is_a_transport_failure() {
    let app = axum::Router::new().route("/tasks", get(|| async { Json(json!({ "success": true })) }));
    let remote = remote_for(format!("http://{}", serve(app).await));

    let err = remote.list().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn failure_envelope_on_error_status_is_a_rejection() {
    let app = axum::Router::new().route(
        "/tasks/{id}",
        delete(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "database locked" })),
            )
        }),
    );
    let remote = remote_for(format!("http://{}", serve(app).await));

    let err = remote.delete(&TaskId::from(1)).await.unwrap_err();
    assert!(
        matches!(err, RemoteError::Rejected { message: Some(ref m) } if m == "database locked")
    );
}

#[tokio::test]
async fn slow_service_times_out() {
    let app = axum::Router::new().route(
        "/tasks",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "success": true, "tasks": [] }))
        }),
    );
    let remote = HttpRemote::new(&RemoteSettings {
        base_url: format!("http://{}", serve(app).await),
        request_timeout: Duration::from_millis(100),
        connect_timeout: Duration::from_secs(1),
    })
    .unwrap();

    let err = remote.list().await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout));

    let store = TaskStore::open(remote).await;
    assert_eq!(
        store.last_error().unwrap().to_string(),
        "Error connecting to API"
    );
    assert!(!store.is_busy());
}

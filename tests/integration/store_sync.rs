//! Integration tests for the task synchronization store.
//!
//! Drives `TaskStore` through whole user sessions against the loopback
//! remote: reconciliation after each confirmed response, error slot
//! behaviour, and busy tracking while requests overlap.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use taskdeck::remote::{Fault, LoopbackRemote, TaskRemote};
use taskdeck::tasks::{Outcome, TaskStore};
use taskdeck_proto::{Task, TaskId, TaskStatus, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task(id: i64, title: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::from(id),
        title: title.to_string(),
        description: None,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap().into(),
    }
}

fn ids<R: TaskRemote>(store: &TaskStore<R>) -> Vec<TaskId> {
    store.tasks().into_iter().map(|t| t.id).collect()
}

/// Gives spawned requests a moment to reach the remote.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// ---------------------------------------------------------------------------
// Full session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_create_complete_then_failed_delete() {
    let remote = LoopbackRemote::with_tasks(vec![
        task(1, "A", TaskStatus::Pending),
        task(2, "B", TaskStatus::Completed),
    ]);
    let store = TaskStore::open(remote).await;

    assert_eq!(ids(&store), [TaskId::from(1), TaskId::from(2)]);
    let stats = store.statistics();
    assert_eq!((stats.total, stats.pending, stats.completed), (2, 1, 1));
    assert!(!store.is_busy());

    assert_eq!(store.create("C", "").await, Outcome::Applied);
    assert_eq!(
        ids(&store),
        [TaskId::from(1), TaskId::from(2), TaskId::from(3)]
    );
    assert_eq!(store.tasks()[2].status, TaskStatus::Pending);
    let stats = store.statistics();
    assert_eq!((stats.total, stats.pending, stats.completed), (3, 2, 1));

    assert_eq!(
        store
            .set_status(&TaskId::from(1), TaskStatus::Completed)
            .await,
        Outcome::Applied
    );
    let stats = store.statistics();
    assert_eq!((stats.total, stats.pending, stats.completed), (3, 1, 2));

    store.remote().inject(Fault::Reject);
    let outcome = store.remove(&TaskId::from(2)).await;
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(store.tasks().len(), 3);
    assert_eq!(
        store.last_error().unwrap().to_string(),
        "Failed to delete task"
    );

    store.dismiss_error();
    assert_eq!(store.last_error(), None);
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_replaces_collection_wholesale() {
    let remote = LoopbackRemote::new();
    let store = TaskStore::new(remote);
    store.create("local view", "").await;

    // Another client deletes everything behind our back.
    let stale = store.tasks();
    store.remote().delete(&stale[0].id).await.unwrap();

    assert_eq!(store.list().await, Outcome::Applied);
    assert!(store.tasks().is_empty());
    assert_eq!(store.tasks(), store.remote().stored());
}

#[tokio::test]
async fn list_accepts_any_created_at_form() {
    let odd: Vec<Task> = serde_json::from_value(serde_json::json!([
        { "id": 1, "title": "A", "status": "pending", "createdAt": "2024-05-01 12:00:00" },
        { "id": 2, "title": "B", "status": "completed", "createdAt": 1_714_564_800_000_i64 },
        { "id": 3, "title": "C", "status": "pending" },
    ]))
    .unwrap();
    let store = TaskStore::new(LoopbackRemote::with_tasks(odd.clone()));

    assert_eq!(store.list().await, Outcome::Applied);
    assert_eq!(store.last_error(), None);
    assert_eq!(store.tasks(), odd);
    assert_eq!(
        store.tasks()[0].created_at,
        Timestamp::Raw(serde_json::json!("2024-05-01 12:00:00"))
    );
}

#[tokio::test]
async fn created_task_equals_service_copy() {
    let store = TaskStore::open(LoopbackRemote::new()).await;
    store.create("Plan trip", "flights and hotel").await;

    let local = store.tasks();
    let remote = store.remote().stored();
    assert_eq!(local.last(), remote.last());
    assert_eq!(
        local[0].description.as_deref(),
        Some("flights and hotel")
    );
}

#[tokio::test]
async fn failures_never_change_tasks() {
    let store = TaskStore::open(LoopbackRemote::with_tasks(vec![
        task(1, "A", TaskStatus::Pending),
        task(2, "B", TaskStatus::Pending),
    ]))
    .await;
    let before = store.tasks();

    for fault in [Fault::Reject, Fault::Disconnect] {
        store.remote().inject(fault);
        assert!(matches!(store.create("X", "").await, Outcome::Failed(_)));
        store.remote().inject(fault);
        assert!(matches!(
            store.set_status(&TaskId::from(1), TaskStatus::Completed).await,
            Outcome::Failed(_)
        ));
        store.remote().inject(fault);
        assert!(matches!(
            store.remove(&TaskId::from(2)).await,
            Outcome::Failed(_)
        ));
        assert_eq!(store.tasks(), before);
        assert!(!store.last_error().unwrap().to_string().is_empty());
    }
}

#[tokio::test]
async fn service_rejection_of_unknown_id_is_reported() {
    let store = TaskStore::open(LoopbackRemote::new()).await;
    let outcome = store.remove(&TaskId::from(99)).await;
    assert!(matches!(outcome, Outcome::Failed(e) if e.to_string() == "Failed to delete task"));
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let store = TaskStore::open(LoopbackRemote::with_tasks(vec![task(
        1,
        "A",
        TaskStatus::Pending,
    )]))
    .await;

    store.remote().inject(Fault::Disconnect);
    store.create("B", "").await;
    assert_eq!(
        store.last_error().unwrap().to_string(),
        "Error creating task"
    );

    store.toggle(&TaskId::from(1)).await;
    assert_eq!(store.last_error(), None);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn busy_is_observable_while_create_is_in_flight() {
    let store = Arc::new(TaskStore::open(LoopbackRemote::new()).await);
    let mut rx = store.subscribe();
    assert!(!rx.borrow_and_update().is_busy());

    let gate = store.remote().hold().await;
    let create = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.create("slow", "").await }
    });

    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_busy());

    drop(gate);
    assert_eq!(create.await.unwrap(), Outcome::Applied);
    assert!(!store.is_busy());
    assert_eq!(store.tasks().len(), 1);
}

#[tokio::test]
async fn list_and_status_change_overlap() {
    let store = Arc::new(
        TaskStore::open(LoopbackRemote::with_tasks(vec![task(
            1,
            "A",
            TaskStatus::Pending,
        )]))
        .await,
    );

    let gate = store.remote().hold().await;
    let list = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.list().await }
    });
    settle().await;
    assert!(store.is_busy());
    drop(gate);

    let update = store
        .set_status(&TaskId::from(1), TaskStatus::Completed)
        .await;
    assert_eq!(update, Outcome::Applied);
    list.await.unwrap();

    assert!(!store.is_busy());
    assert_eq!(store.tasks().len(), 1);
}

#[tokio::test]
async fn concurrent_creates_all_land() {
    let store = Arc::new(TaskStore::open(LoopbackRemote::new()).await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(&format!("task {i}"), "").await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Outcome::Applied);
    }

    assert_eq!(store.tasks().len(), 8);
    assert!(!store.is_busy());
    let mut seen: Vec<_> = store
        .tasks()
        .into_iter()
        .filter_map(|t| t.id.as_number())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn update_landing_after_remove_does_not_resurrect() {
    let store = Arc::new(
        TaskStore::open(LoopbackRemote::with_tasks(vec![task(
            1,
            "A",
            TaskStatus::Pending,
        )]))
        .await,
    );

    // Both requests wait at the gate; the service may apply them in either
    // order.
    let gate = store.remote().hold().await;
    let update = tokio::spawn({
        let store = Arc::clone(&store);
        async move {
            store
                .set_status(&TaskId::from(1), TaskStatus::Completed)
                .await
        }
    });
    let remove = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.remove(&TaskId::from(1)).await }
    });
    settle().await;
    drop(gate);

    let update = update.await.unwrap();
    let remove = remove.await.unwrap();

    assert!(remove.is_applied());
    assert!(matches!(update, Outcome::Applied | Outcome::Failed(_)));
    assert!(store.get(&TaskId::from(1)).is_none());
    assert!(store.tasks().is_empty());
}

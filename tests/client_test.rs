//! Integration tests for the task transport client against a real server.
//! Spins up the axum server on a free port with an in-memory store.

use std::sync::Arc;

use taskpad::client::{ClientError, MutationOutcome, TaskClient};
use taskpad::config::AppConfig;
use taskpad::model::TaskRecord;
use taskpad::server::{build_router, store::TaskStore, ServerContext};

async fn start_test_server() -> TaskClient {
    let store = TaskStore::open_in_memory().await.unwrap();
    let config = Arc::new(AppConfig {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        server_url: String::new(),
        data_dir: std::env::temp_dir(),
        log: "warn".to_string(),
        log_format: "pretty".to_string(),
    });
    let ctx = Arc::new(ServerContext { config, store });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(ctx);
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    TaskClient::new(format!("http://{addr}"))
}

fn draft(title: &str, description: &str) -> TaskRecord {
    let mut d = TaskRecord::new();
    d.set("title", title);
    d.set("description", description);
    d
}

fn saved(outcome: MutationOutcome) -> TaskRecord {
    match outcome {
        MutationOutcome::Saved(task) => task,
        MutationOutcome::Rejected(errors) => panic!("unexpected rejection: {errors:?}"),
    }
}

fn rejected(outcome: MutationOutcome) -> taskpad::model::FieldErrors {
    match outcome {
        MutationOutcome::Rejected(errors) => errors,
        MutationOutcome::Saved(task) => panic!("unexpected save: {task:?}"),
    }
}

#[tokio::test]
async fn create_assigns_id_and_defaults_status() {
    let client = start_test_server().await;

    let task = saved(client.create(&draft("groceries", "milk and eggs")).await.unwrap());
    assert!(task.id().is_some());
    assert_eq!(task.text("title"), "groceries");
    assert_eq!(task.text("status"), "pending");
    assert!(!task.text("created_at").is_empty());
}

#[tokio::test]
async fn create_rejected_with_exact_messages() {
    let client = start_test_server().await;

    // Missing fields
    let errors = rejected(client.create(&TaskRecord::new()).await.unwrap());
    assert_eq!(errors.get("title").unwrap(), "Title is required");
    assert_eq!(errors.get("description").unwrap(), "Description is required");

    // Too-short fields
    let errors = rejected(client.create(&draft("ab", "abcd")).await.unwrap());
    assert_eq!(
        errors.get("title").unwrap(),
        "Title must be 3 characters or longer"
    );
    assert_eq!(
        errors.get("description").unwrap(),
        "Description must be 5 characters or longer"
    );

    // Nothing was persisted
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_all_in_creation_order() {
    let client = start_test_server().await;

    let a = saved(client.create(&draft("first", "first task")).await.unwrap());
    let b = saved(client.create(&draft("second", "second task")).await.unwrap());

    let tasks = client.list().await.unwrap();
    assert_eq!(
        tasks.iter().map(|t| t.id()).collect::<Vec<_>>(),
        vec![a.id(), b.id()]
    );
}

#[tokio::test]
async fn get_one_returns_the_stored_record() {
    let client = start_test_server().await;

    let created = saved(client.create(&draft("fetch me", "round trip")).await.unwrap());
    let fetched = client.get_one(created.id().unwrap()).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_one_unknown_id_is_a_transport_error() {
    let client = start_test_server().await;

    let err = client.get_one(999).await.unwrap_err();
    match err {
        ClientError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn update_replaces_fields_and_touches_updated_at() {
    let client = start_test_server().await;

    let mut task = saved(client.create(&draft("before", "the old text")).await.unwrap());
    let id = task.id().unwrap();
    task.set("title", "after");
    task.set("status", "done");

    let updated = saved(client.update(id, &task).await.unwrap());
    assert_eq!(updated.text("title"), "after");
    assert_eq!(updated.text("status"), "done");

    let fetched = client.get_one(id).await.unwrap();
    assert_eq!(fetched.text("title"), "after");
}

#[tokio::test]
async fn update_rejected_leaves_stored_record_untouched() {
    let client = start_test_server().await;

    let mut task = saved(client.create(&draft("keep me", "stays intact")).await.unwrap());
    let id = task.id().unwrap();
    task.set("title", "x");

    let errors = rejected(client.update(id, &task).await.unwrap());
    assert_eq!(
        errors.get("title").unwrap(),
        "Title must be 3 characters or longer"
    );

    let fetched = client.get_one(id).await.unwrap();
    assert_eq!(fetched.text("title"), "keep me");
}

#[tokio::test]
async fn update_without_status_keeps_stored_status() {
    let client = start_test_server().await;

    let task = saved(client.create(&draft("stable", "status survives")).await.unwrap());
    let id = task.id().unwrap();

    let updated = saved(client.update(id, &draft("stable", "status survives")).await.unwrap());
    assert_eq!(updated.text("status"), "pending");
}

#[tokio::test]
async fn update_unknown_id_is_a_transport_error() {
    let client = start_test_server().await;

    let err = client.update(999, &draft("ghost", "not there")).await.unwrap_err();
    match err {
        ClientError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_removes_the_record_and_is_idempotent() {
    let client = start_test_server().await;

    let task = saved(client.create(&draft("doomed", "short-lived")).await.unwrap());
    let id = task.id().unwrap();

    client.delete(id).await.unwrap();
    assert!(client.list().await.unwrap().is_empty());

    // Second delete is still an ack
    client.delete(id).await.unwrap();
}

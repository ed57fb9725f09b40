// Task resource handlers.
//
// Validation failures deliberately answer 200 with an `errors` body — the
// browser-era client contract distinguishes success from rejection by body
// shape, not status code. Only unknown ids (404) and store failures (500)
// use error statuses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::model::TaskRecord;
use crate::server::store::validate;
use crate::server::ServerContext;

type RouteError = (StatusCode, Json<Value>);

fn internal(err: anyhow::Error) -> RouteError {
    error!("task store error: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
}

fn not_found(id: i64) -> RouteError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("task {id} not found") })),
    )
}

pub async fn list_tasks(
    State(ctx): State<Arc<ServerContext>>,
) -> Result<Json<Value>, RouteError> {
    let rows = ctx.store.list().await.map_err(internal)?;
    let tasks: Vec<TaskRecord> = rows.into_iter().map(|r| r.into_record()).collect();
    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn get_task(
    State(ctx): State<Arc<ServerContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, RouteError> {
    match ctx.store.get(id).await.map_err(internal)? {
        Some(row) => Ok(Json(json!({ "task": row.into_record() }))),
        None => Err(not_found(id)),
    }
}

pub async fn create_task(
    State(ctx): State<Arc<ServerContext>>,
    Json(payload): Json<TaskRecord>,
) -> Result<Json<Value>, RouteError> {
    let errors = validate(&payload);
    if !errors.is_empty() {
        return Ok(Json(json!({ "errors": errors })));
    }

    let row = ctx
        .store
        .insert(payload.text("title"), payload.text("description"))
        .await
        .map_err(internal)?;
    Ok(Json(json!({ "task": row.into_record() })))
}

pub async fn update_task(
    State(ctx): State<Arc<ServerContext>>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskRecord>,
) -> Result<Json<Value>, RouteError> {
    let errors = validate(&payload);
    if !errors.is_empty() {
        return Ok(Json(json!({ "errors": errors })));
    }

    // A payload without a status keeps the stored one.
    let status = match payload.text("status") {
        "" => match ctx.store.get(id).await.map_err(internal)? {
            Some(row) => row.status,
            None => return Err(not_found(id)),
        },
        s => s.to_owned(),
    };

    let updated = ctx
        .store
        .update(id, payload.text("title"), payload.text("description"), &status)
        .await
        .map_err(internal)?;
    match updated {
        Some(row) => Ok(Json(json!({ "task": row.into_record() }))),
        None => Err(not_found(id)),
    }
}

pub async fn delete_task(
    State(ctx): State<Arc<ServerContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, RouteError> {
    ctx.store.delete(id).await.map_err(internal)?;
    Ok(Json(json!({ "status": 200 })))
}

// Task HTTP server.
//
// Axum server exposing the /task resource consumed by the terminal UI, the
// one-shot CLI commands, and any browser front-end (hence the permissive
// CORS layer).
//
// Endpoints:
//   GET    /task
//   POST   /task
//   GET    /task/{id}
//   PUT    /task/{id}
//   DELETE /task/{id}

pub mod routes;
pub mod store;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use store::TaskStore;

/// Shared state passed to every route handler.
pub struct ServerContext {
    pub config: Arc<AppConfig>,
    pub store: TaskStore,
}

pub fn build_router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/task", get(routes::list_tasks).post(routes::create_task))
        .route(
            "/task/{id}",
            get(routes::get_task)
                .put(routes::update_task)
                .delete(routes::delete_task),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(ctx: Arc<ServerContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("task server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

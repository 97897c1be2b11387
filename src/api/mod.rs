//! Web API module

pub mod handlers;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::operations::tasks::TaskService;

/// Axum handler 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(tasks: TaskService) -> Self {
        Self { tasks }
    }
}

/// Create the full router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::pages::index))
        .route("/done", get(handlers::pages::done))
        // Task mutations
        .route("/del_li", post(handlers::tasks::complete_task))
        .route("/udel_li", post(handlers::tasks::uncomplete_task))
        .route("/add_li", post(handlers::tasks::create_task))
        // JSON views
        .route("/api/tasks", get(handlers::tasks::list_pending))
        .route("/api/done", get(handlers::tasks::list_done))
        // Health
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the web server, stop on Ctrl+C
pub async fn start_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "todolist server started");
    println!("To-do list: http://localhost:{}", local_addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl+c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

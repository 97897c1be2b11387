//! Health check handler

use axum::{extract::State, http::StatusCode};

use super::blocking;
use crate::api::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let service = state.tasks.clone();
    match blocking(move || service.health()).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error")
        }
    }
}

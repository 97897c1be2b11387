//! HTML page handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::blocking;
use crate::api::{templates, AppState};
use crate::error::{TodoError, MSG_SERVER_ERROR};

fn page_error(e: TodoError) -> Response {
    tracing::error!(error = %e, "page render failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(MSG_SERVER_ERROR)).into_response()
}

/// GET /
/// 待办列表
pub async fn index(State(state): State<AppState>) -> Response {
    let service = state.tasks.clone();
    let result = blocking(move || service.list_pending())
        .await
        .and_then(|tasks| templates::render_index(&tasks));

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => page_error(e),
    }
}

/// GET /done
/// 已完成任务，按日期分组
pub async fn done(State(state): State<AppState>) -> Response {
    let service = state.tasks.clone();
    let result = blocking(move || service.list_completed_grouped())
        .await
        .and_then(|grouped| templates::render_done(&grouped));

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => page_error(e),
    }
}

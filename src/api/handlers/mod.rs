//! API handlers

pub mod health;
pub mod pages;
pub mod tasks;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{Result, TodoError};

/// 业务错误到 HTTP 响应的转换：`{status: "error", message}` + 400/500
pub struct ApiError(pub TodoError);

impl From<TodoError> for ApiError {
    fn from(e: TodoError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::warn!(error = %self.0, "request rejected");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = json!({
            "status": "error",
            "message": self.0.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

/// 在阻塞线程池上执行 SQLite 操作
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TodoError::storage(format!("blocking task failed: {e}")))?
}

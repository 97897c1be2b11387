//! Task API handlers
//!
//! `/del_li` 与 `/udel_li` 只切换完成状态，不删除任务。

use std::collections::BTreeMap;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{blocking, ApiError};
use crate::api::templates::grouped_views;
use crate::api::AppState;
use crate::error::TodoError;
use crate::storage::tasks::{Task, TaskView};

// ============================================================================
// Response DTOs
// ============================================================================

/// `{status: "ok"}`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// 新建任务的响应
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub status: &'static str,
    pub task: TaskView,
}

/// 待办列表（JSON）
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub status: &'static str,
    pub tasks: Vec<TaskView>,
}

/// 已完成分组（JSON）
#[derive(Debug, Serialize)]
pub struct DoneResponse {
    pub status: &'static str,
    pub tasks_by_date: BTreeMap<String, Vec<TaskView>>,
}

// ============================================================================
// Request parsing
// ============================================================================

/// 请求体必须是 JSON 对象，否则按服务器错误处理
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, TodoError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TodoError::malformed(format!("expected a JSON object, got {other}"))),
        Err(e) => Err(TodoError::malformed(format!("invalid JSON body: {e}"))),
    }
}

/// 取 `taskId`，支持数字与数字字符串
fn task_id_from(body: &Map<String, Value>) -> Option<i64> {
    match body.get("taskId")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 取 `task`
///
/// 缺失、null、false、0、空串、空数组和空对象都视为空名；非零数字按文本保存；
/// 其他类型无法作为任务名。
fn task_name_from(body: &Map<String, Value>) -> Result<String, TodoError> {
    match body.get("task") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(String::new()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Array(a)) if a.is_empty() => Ok(String::new()),
        Some(Value::Object(o)) if o.is_empty() => Ok(String::new()),
        Some(other) => Err(TodoError::malformed(format!("unusable task name {other}"))),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// POST /del_li
/// 标记任务为已完成
pub async fn complete_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    toggle(state, &body, true).await
}

/// POST /udel_li
/// 取消完成
pub async fn uncomplete_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    toggle(state, &body, false).await
}

async fn toggle(state: AppState, body: &Bytes, done: bool) -> Result<Json<StatusResponse>, ApiError> {
    let task_id = task_id_from(&parse_body(body)?)
        .ok_or_else(|| TodoError::not_found("missing or invalid taskId"))?;

    let service = state.tasks.clone();
    blocking(move || {
        if done {
            service.complete(task_id)
        } else {
            service.uncomplete(task_id)
        }
    })
    .await?;

    Ok(Json(StatusResponse::ok()))
}

/// POST /add_li
/// 新建任务
pub async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateTaskResponse>, ApiError> {
    let name = task_name_from(&parse_body(&body)?)?;

    let service = state.tasks.clone();
    let task: Task = blocking(move || service.create(&name)).await?;

    Ok(Json(CreateTaskResponse {
        status: "ok",
        task: task.to_view(),
    }))
}

/// GET /api/tasks
/// 未完成任务（JSON）
pub async fn list_pending(State(state): State<AppState>) -> Result<Json<TaskListResponse>, ApiError> {
    let service = state.tasks.clone();
    let tasks = blocking(move || service.list_pending()).await?;

    Ok(Json(TaskListResponse {
        status: "ok",
        tasks: tasks.iter().map(Task::to_view).collect(),
    }))
}

/// GET /api/done
/// 已完成任务按日期分组（JSON）
pub async fn list_done(State(state): State<AppState>) -> Result<Json<DoneResponse>, ApiError> {
    let service = state.tasks.clone();
    let grouped = blocking(move || service.list_completed_grouped()).await?;

    Ok(Json(DoneResponse {
        status: "ok",
        tasks_by_date: grouped_views(&grouped),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_task_id_from_number_and_string() {
        assert_eq!(task_id_from(&object(json!({"taskId": 7}))), Some(7));
        assert_eq!(task_id_from(&object(json!({"taskId": "12"}))), Some(12));
        assert_eq!(task_id_from(&object(json!({"taskId": " 3 "}))), Some(3));
        assert_eq!(task_id_from(&object(json!({"taskId": "abc"}))), None);
        assert_eq!(task_id_from(&object(json!({"taskId": 1.5}))), None);
        assert_eq!(task_id_from(&object(json!({"taskId": null}))), None);
        assert_eq!(task_id_from(&object(json!({}))), None);
    }

    #[test]
    fn test_task_name_from() {
        let name = |v: Value| task_name_from(&object(v));
        assert_eq!(name(json!({"task": "buy milk"})).unwrap(), "buy milk");
        assert_eq!(name(json!({"task": "   "})).unwrap(), "   ");
        assert_eq!(name(json!({"task": 5})).unwrap(), "5");
        assert_eq!(name(json!({"task": 2.5})).unwrap(), "2.5");

        for empty in [
            json!({}),
            json!({"task": null}),
            json!({"task": false}),
            json!({"task": 0}),
            json!({"task": ""}),
            json!({"task": []}),
            json!({"task": {}}),
        ] {
            assert_eq!(name(empty).unwrap(), "");
        }

        assert!(matches!(name(json!({"task": true})), Err(TodoError::MalformedRequest(_))));
        assert!(matches!(name(json!({"task": ["a"]})), Err(TodoError::MalformedRequest(_))));
    }

    #[test]
    fn test_parse_body_requires_object() {
        assert_eq!(
            parse_body(&Bytes::from_static(br#"{"task":"x"}"#)).unwrap(),
            object(json!({"task": "x"}))
        );
        let bodies: [&[u8]; 5] = [b"not json", b"", b"null", b"[1]", b"\"x\""];
        for raw in bodies {
            let err = parse_body(&Bytes::copy_from_slice(raw)).unwrap_err();
            assert!(matches!(err, TodoError::MalformedRequest(_)));
        }
    }
}

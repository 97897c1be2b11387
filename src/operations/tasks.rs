//! 待办任务的业务逻辑
//!
//! 每个操作在一个事务内完成：成功提交，失败回滚。HTTP 层只负责把
//! [`TodoError`] 转成响应，不直接接触数据库。

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use tracing::{info, instrument};

use crate::error::{Result, TodoError, MSG_EMPTY_NAME, MSG_NAME_TOO_LONG};
use crate::storage::tasks::{self, Task, MAX_NAME_LEN};
use crate::storage::Database;

/// 没有日期的已完成任务归入此分组
pub const UNSPECIFIED_DATE: &str = "未指定日期";

/// 按日期分组的已完成任务，key 升序
pub type TasksByDate = BTreeMap<String, Vec<Task>>;

/// 任务服务，持有数据库句柄
#[derive(Clone)]
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 所有未完成任务
    #[instrument(skip(self))]
    pub fn list_pending(&self) -> Result<Vec<Task>> {
        self.db.with_conn(|conn| tasks::list_by_done(conn, false))
    }

    /// 标记为已完成
    pub fn complete(&self, task_id: i64) -> Result<Task> {
        self.set_done(task_id, true)
    }

    /// 取消完成
    pub fn uncomplete(&self, task_id: i64) -> Result<Task> {
        self.set_done(task_id, false)
    }

    /// 切换完成状态。重复设置同一状态不报错
    #[instrument(skip(self))]
    fn set_done(&self, task_id: i64, done: bool) -> Result<Task> {
        let task = self.db.with_tx(|tx| {
            let mut task = tasks::get(tx, task_id)?
                .ok_or_else(|| TodoError::not_found(format!("task {task_id}")))?;

            if task.done != done {
                tasks::set_done(tx, task_id, done)?;
            }
            task.done = done;
            Ok(task)
        })?;

        info!(task_id, done, "task status updated");
        Ok(task)
    }

    /// 新建任务，时间取当前 UTC
    pub fn create(&self, name: &str) -> Result<Task> {
        self.create_at(name, Utc::now().naive_utc())
    }

    /// 新建任务，指定创建时间
    #[instrument(skip(self))]
    pub fn create_at(&self, name: &str, date: NaiveDateTime) -> Result<Task> {
        validate_name(name)?;

        let task = self.db.with_tx(|tx| {
            if tasks::find_pending_by_name(tx, name)?.is_some() {
                return Err(TodoError::duplicate(name));
            }
            tasks::insert(tx, name, false, Some(date))
        })?;

        info!(task_id = task.id, name = %task.name, "task created");
        Ok(task)
    }

    /// 已完成任务按日期分组
    #[instrument(skip(self))]
    pub fn list_completed_grouped(&self) -> Result<TasksByDate> {
        let done = self.db.with_conn(tasks::list_done_by_date)?;
        Ok(group_by_date(done))
    }

    /// 数据库连通性检查
    pub fn health(&self) -> Result<()> {
        self.db.with_conn(tasks::ping)
    }
}

/// 校验任务名：不能为空，不能超过 250 个字符。空白字符原样保留
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TodoError::validation(MSG_EMPTY_NAME));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TodoError::validation(MSG_NAME_TOO_LONG));
    }
    Ok(())
}

/// 按日期分组，组内保持输入顺序
pub fn group_by_date(done: Vec<Task>) -> TasksByDate {
    let mut grouped = TasksByDate::new();
    for task in done {
        let key = task
            .day_key()
            .unwrap_or_else(|| UNSPECIFIED_DATE.to_string());
        grouped.entry(key).or_default().push(task);
    }
    grouped
}

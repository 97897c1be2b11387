use chrono::{NaiveDateTime, Timelike};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};

/// 任务名最大长度（字符数）
pub const MAX_NAME_LEN: usize = 250;

/// 数据库中的时间格式（UTC，无时区）
const DB_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// 展示用时间格式
const VIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// 分组用日期格式
const DAY_FORMAT: &str = "%Y-%m-%d";

/// 任务数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 自增 ID
    pub id: i64,
    /// 任务名称
    pub name: String,
    /// 是否已完成
    pub done: bool,
    /// 创建时间（旧数据可能为空）
    pub date: Option<NaiveDateTime>,
}

/// 对外的任务表示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    pub name: String,
    pub done: bool,
    /// "YYYY-MM-DD HH:MM" 或 null
    pub date: Option<String>,
}

impl Task {
    pub fn to_view(&self) -> TaskView {
        TaskView {
            id: self.id,
            name: self.name.clone(),
            done: self.done,
            date: self.date.map(|d| d.format(VIEW_DATE_FORMAT).to_string()),
        }
    }

    /// 日期分组的 key（YYYY-MM-DD），无日期返回 None
    pub fn day_key(&self) -> Option<String> {
        self.date.map(|d| d.format(DAY_FORMAT).to_string())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, done, date FROM flask_list";

/// 旧表的 `done` 列允许 NULL，按默认值 false 处理
fn row_to_task(row: &Row<'_>) -> rusqlite::Result<(i64, String, bool, Option<String>)> {
    let done: Option<bool> = row.get(2)?;
    Ok((row.get(0)?, row.get(1)?, done.unwrap_or(false), row.get(3)?))
}

fn build_task(raw: (i64, String, bool, Option<String>)) -> Result<Task> {
    let (id, name, done, date) = raw;
    let date = match date {
        Some(s) => Some(parse_db_date(&s).ok_or_else(|| {
            TodoError::storage(format!("flask_list.date: invalid timestamp '{s}' (id {id})"))
        })?),
        None => None,
    };
    Ok(Task {
        id,
        name,
        done,
        date,
    })
}

/// 解析数据库里的时间，兼容带微秒和 RFC 3339 的旧数据
pub fn parse_db_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DB_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, VIEW_DATE_FORMAT))
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|d| d.naive_utc())
        })
}

pub fn format_db_date(date: &NaiveDateTime) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}

fn query_tasks(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt
        .query_map(params, row_to_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    raw.into_iter().map(build_task).collect()
}

/// 按完成状态列出任务（按 id 升序）
pub fn list_by_done(conn: &Connection, done: bool) -> Result<Vec<Task>> {
    query_tasks(
        conn,
        &format!("{SELECT_COLUMNS} WHERE COALESCE(done, 0) = ?1 ORDER BY id"),
        [done],
    )
}

/// 已完成任务，按时间升序，同一时间按 id；无日期的排在最前
///
/// 旧数据的时间文本格式不统一，排序按解析后的时间在内存中完成。
pub fn list_done_by_date(conn: &Connection) -> Result<Vec<Task>> {
    let mut done = query_tasks(conn, &format!("{SELECT_COLUMNS} WHERE done = 1"), [])?;
    done.sort_by_key(|t| (t.date, t.id));
    Ok(done)
}

/// 按 ID 查找
pub fn get(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let raw = conn
        .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], row_to_task)
        .optional()?;
    raw.map(build_task).transpose()
}

/// 查找同名的未完成任务
pub fn find_pending_by_name(conn: &Connection, name: &str) -> Result<Option<Task>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE name = ?1 AND COALESCE(done, 0) = 0 ORDER BY id LIMIT 1"),
            [name],
            row_to_task,
        )
        .optional()?;
    raw.map(build_task).transpose()
}

/// 插入新任务
pub fn insert(conn: &Connection, name: &str, done: bool, date: Option<NaiveDateTime>) -> Result<Task> {
    conn.execute(
        "INSERT INTO flask_list (name, done, date) VALUES (?1, ?2, ?3)",
        params![name, done, date.as_ref().map(format_db_date)],
    )?;
    let id = conn.last_insert_rowid();

    Ok(Task {
        id,
        name: name.to_string(),
        done,
        // 与数据库中保存的精度一致（秒）
        date: date.and_then(|d| d.with_nanosecond(0)),
    })
}

/// 更新完成状态，返回受影响的行数
pub fn set_done(conn: &Connection, id: i64, done: bool) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE flask_list SET done = ?1 WHERE id = ?2",
        params![done, id],
    )?)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM flask_list", [], |row| row.get(0))?)
}

/// 健康检查：连接可用且任务表可读
pub fn ping(conn: &Connection) -> Result<()> {
    let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    if one != 1 {
        return Err(TodoError::storage("SELECT 1 returned unexpected value"));
    }
    count(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let task = insert(conn, "buy milk", false, Some(at(2024, 1, 1, 9, 30)))?;
            assert_eq!(task.id, 1);

            let fetched = get(conn, task.id)?.unwrap();
            assert_eq!(fetched, task);
            assert!(get(conn, 99)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_to_view_format() {
        let task = Task {
            id: 3,
            name: "read".into(),
            done: true,
            date: Some(at(2024, 3, 5, 7, 8)),
        };
        let view = task.to_view();
        assert_eq!(view.date.as_deref(), Some("2024-03-05 07:08"));
        assert_eq!(task.day_key().as_deref(), Some("2024-03-05"));

        let undated = Task { date: None, ..task };
        assert_eq!(undated.to_view().date, None);
        assert_eq!(undated.day_key(), None);
    }

    #[test]
    fn test_view_serializes_null_date() {
        let task = Task {
            id: 1,
            name: "x".into(),
            done: false,
            date: None,
        };
        let json = serde_json::to_value(task.to_view()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "x", "done": false, "date": null})
        );
    }

    #[test]
    fn test_list_by_done_and_set_done() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let a = insert(conn, "a", false, None)?;
            let b = insert(conn, "b", false, None)?;
            assert_eq!(set_done(conn, b.id, true)?, 1);
            assert_eq!(set_done(conn, 42, true)?, 0);

            let pending = list_by_done(conn, false)?;
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id, a.id);

            let done = list_by_done(conn, true)?;
            assert_eq!(done.len(), 1);
            assert_eq!(done[0].name, "b");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_pending_by_name_ignores_done() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let t = insert(conn, "walk", false, None)?;
            assert!(find_pending_by_name(conn, "walk")?.is_some());
            set_done(conn, t.id, true)?;
            assert!(find_pending_by_name(conn, "walk")?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_done_by_date_order() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            insert(conn, "late", true, Some(at(2024, 1, 2, 8, 0)))?;
            insert(conn, "early", true, Some(at(2024, 1, 1, 9, 0)))?;
            insert(conn, "undated", true, None)?;
            insert(conn, "pending", false, Some(at(2023, 1, 1, 0, 0)))?;

            let names: Vec<String> = list_done_by_date(conn)?.into_iter().map(|t| t.name).collect();
            assert_eq!(names, vec!["undated", "early", "late"]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_done_order_uses_parsed_dates() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "INSERT INTO flask_list (name, done, date) VALUES ('ten', 1, '2024-01-01 10:00:00');
                 INSERT INTO flask_list (name, done, date) VALUES ('nine', 1, '2024-01-01T09:00:00');
                 INSERT INTO flask_list (name, done, date) VALUES ('ten-again', 1, '2024-01-01T10:00:00');",
            )?;

            let names: Vec<String> = list_done_by_date(conn)?.into_iter().map(|t| t.name).collect();
            assert_eq!(names, vec!["nine", "ten", "ten-again"]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_null_done_reads_as_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            // SQLAlchemy 建的旧表：done 可为 NULL，date 为 DATETIME
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE flask_list (
                     id INTEGER NOT NULL PRIMARY KEY,
                     name VARCHAR(250) NOT NULL,
                     done BOOLEAN,
                     date DATETIME
                 );
                 INSERT INTO flask_list (id, name, done, date)
                     VALUES (1, 'legacy', NULL, '2023-05-01 08:00:00.000000');",
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.with_conn(|conn| {
            let task = get(conn, 1)?.unwrap();
            assert!(!task.done);
            assert_eq!(list_by_done(conn, false)?.len(), 1);
            assert!(find_pending_by_name(conn, "legacy")?.is_some());

            set_done(conn, 1, true)?;
            assert!(get(conn, 1)?.unwrap().done);
            assert_eq!(list_done_by_date(conn)?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_ping_fails_without_task_table() {
        let db = Database::in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE flask_list")?;
            ping(conn)
        });
        assert!(matches!(result, Err(TodoError::Storage(_))));
    }

    #[test]
    fn test_parse_legacy_dates() {
        let expected = at(2024, 1, 1, 10, 0);
        assert_eq!(parse_db_date("2024-01-01 10:00:00"), Some(expected));
        assert_eq!(
            parse_db_date("2024-01-01 10:00:00.123456").map(|d| d.format(DB_DATE_FORMAT).to_string()),
            Some("2024-01-01 10:00:00".to_string())
        );
        assert_eq!(parse_db_date("2024-01-01T10:00:00"), Some(expected));
        assert_eq!(parse_db_date("2024-01-01T10:00:00+00:00"), Some(expected));
        assert_eq!(parse_db_date("yesterday"), None);
    }

    #[test]
    fn test_corrupt_date_is_storage_error() {
        let db = Database::in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO flask_list (name, done, date) VALUES ('x', 0, 'garbage')",
                [],
            )?;
            list_by_done(conn, false)
        });
        assert!(matches!(result, Err(TodoError::Storage(_))));
    }

    #[test]
    fn test_ping() {
        let db = Database::in_memory().unwrap();
        db.with_conn(ping).unwrap();
    }
}

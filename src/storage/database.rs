//! SQLite 连接与事务

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use super::schema;
use crate::error::{Result, TodoError};

/// 线程安全的 SQLite 连接包装（rusqlite 的 Connection 不是 Sync）
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// 打开（或创建）指定路径的数据库，并建表
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init(&conn)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    /// 按连接串打开数据库
    ///
    /// 支持的形式：
    /// - `sqlite:///relative.db`、`sqlite:////abs/path.db`
    /// - `sqlite://path.db`
    /// - `sqlite://`、`sqlite::memory:`、`:memory:`（内存库）
    /// - 不带 scheme 的文件路径
    pub fn open_url(url: &str) -> Result<Self> {
        match parse_database_url(url)? {
            DatabaseTarget::Memory => Self::in_memory(),
            DatabaseTarget::File(path) => Self::open(&path),
        }
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(schema::PRAGMAS)
            .map_err(|e| TodoError::storage(format!("pragmas: {e}")))?;
        conn.execute_batch(schema::CREATE_TABLES)
            .map_err(|e| TodoError::storage(format!("schema: {e}")))?;

        let version: Option<u32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| TodoError::storage(format!("schema version: {e}")))?;

        if version.is_none() {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [schema::SCHEMA_VERSION],
            )
            .map_err(|e| TodoError::storage(format!("schema version: {e}")))?;
        }
        Ok(())
    }

    /// 以只读方式使用连接
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// 在事务中执行：闭包返回 Ok 则提交，返回 Err 则回滚
    ///
    /// 提交失败时 `Transaction` 在 drop 时自动回滚。
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback() {
                    warn!(error = %rb, "rollback failed");
                } else {
                    debug!(error = %e, "transaction rolled back");
                }
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}

/// 连接串解析结果
#[derive(Debug, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

/// 解析数据库连接串，只接受 SQLite
pub fn parse_database_url(url: &str) -> Result<DatabaseTarget> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TodoError::config("database url is empty"));
    }

    if url == ":memory:" || url == "sqlite::memory:" || url == "sqlite://" {
        return Ok(DatabaseTarget::Memory);
    }

    // SQLAlchemy 风格：sqlite:///relative 或 sqlite:////absolute
    if let Some(rest) = url.strip_prefix("sqlite:///") {
        return Ok(DatabaseTarget::File(PathBuf::from(rest)));
    }
    if let Some(rest) = url.strip_prefix("sqlite://") {
        return Ok(DatabaseTarget::File(PathBuf::from(rest)));
    }
    if let Some(rest) = url.strip_prefix("sqlite:") {
        return Ok(DatabaseTarget::File(PathBuf::from(rest)));
    }

    if let Some((scheme, _)) = url.split_once("://") {
        return Err(TodoError::config(format!(
            "unsupported database scheme '{scheme}', only sqlite is available"
        )));
    }

    Ok(DatabaseTarget::File(PathBuf::from(url)))
}

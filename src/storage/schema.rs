//! SQLite 表结构
//!
//! `flask_list` 沿用旧表名，已有数据库可以直接挂载。

pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS flask_list (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(250) NOT NULL,
    done BOOLEAN NOT NULL DEFAULT 0,
    date TEXT
);

CREATE INDEX IF NOT EXISTS idx_flask_list_done_name ON flask_list(done, name);
CREATE INDEX IF NOT EXISTS idx_flask_list_done_date ON flask_list(done, date);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;

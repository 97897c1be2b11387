pub mod config;
pub mod database;
pub mod schema;
pub mod tasks;

pub use database::Database;

use std::path::PathBuf;

/// 获取 ~/.todolist/ 目录路径（取不到 home 时退回当前目录）
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".todolist")
}

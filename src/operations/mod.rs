//! 业务操作层，供 Web API 与命令行共用

pub mod tasks;

//! 应用配置
//!
//! 配置按以下顺序叠加（后者覆盖前者）：
//! 环境档位默认值 → `~/.todolist/config.toml` → 环境变量 → 命令行参数。
//!
//! 只有启动流程（`main` / `cli`）读取进程环境变量，业务代码只接收最终的 [`Config`]。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::app_dir;
use crate::error::{Result, TodoError};

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 5000;
/// 默认监听地址
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(TodoError::config(format!("unknown environment '{other}'"))),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// 最终生效的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub env: AppEnv,
    /// 数据库连接串（仅支持 sqlite）
    pub database_url: String,
    /// 调试模式：日志默认级别提升到 debug
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// 各环境档位的默认值
    pub fn for_env(env: AppEnv) -> Self {
        match env {
            AppEnv::Development => Self {
                env,
                database_url: "sqlite:///todolist-dev.db".to_string(),
                debug: true,
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            AppEnv::Production => Self {
                env,
                database_url: "sqlite:///local.db".to_string(),
                debug: false,
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
        }
    }

    /// 叠加配置文件中对应档位的设置
    pub fn apply_file(&mut self, file: &ConfigFile) {
        if let Some(host) = &file.server.host {
            self.host = host.clone();
        }
        if let Some(port) = file.server.port {
            self.port = port;
        }

        let profile = match self.env {
            AppEnv::Development => &file.development,
            AppEnv::Production => &file.production,
        };
        if let Some(url) = &profile.database_url {
            self.database_url = url.clone();
        }
        if let Some(debug) = profile.debug {
            self.debug = debug;
        }
    }

    /// 叠加环境变量
    pub fn apply_env(&mut self, vars: &EnvOverrides) {
        let url = match self.env {
            AppEnv::Development => &vars.dev_database_url,
            AppEnv::Production => &vars.database_url,
        };
        if let Some(url) = url.as_ref().filter(|u| !u.trim().is_empty()) {
            self.database_url = url.clone();
        }
    }
}

/// 配置文件结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub development: ProfileSection,
    #[serde(default)]
    pub production: ProfileSection,
}

/// `[server]` 配置段
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// `[development]` / `[production]` 配置段
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileSection {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub debug: Option<bool>,
}

/// 启动时从进程环境读到的值
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// TODO_ENV
    pub env: Option<String>,
    /// DATABASE_URL（生产环境）
    pub database_url: Option<String>,
    /// DEV_DATABASE_URL（开发环境）
    pub dev_database_url: Option<String>,
}

impl EnvOverrides {
    pub fn from_process() -> Self {
        Self {
            env: std::env::var("TODO_ENV").ok(),
            database_url: std::env::var("DATABASE_URL").ok(),
            dev_database_url: std::env::var("DEV_DATABASE_URL").ok(),
        }
    }
}

/// 确定运行环境：命令行优先，其次 TODO_ENV，默认开发环境
pub fn resolve_env(cli: Option<AppEnv>, vars: &EnvOverrides) -> Result<AppEnv> {
    if let Some(env) = cli {
        return Ok(env);
    }
    match vars.env.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Ok(AppEnv::default()),
    }
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// 加载配置文件（不存在则返回默认值）
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// 组装最终配置
pub fn load(
    env: AppEnv,
    file_path: Option<&Path>,
    vars: &EnvOverrides,
) -> Result<Config> {
    let mut config = Config::for_env(env);

    let default_path = config_path();
    let file = load_config_file(file_path.unwrap_or(default_path.as_path()))?;
    config.apply_file(&file);
    config.apply_env(vars);

    Ok(config)
}

//! CLI 模块

pub mod check;
pub mod migrate;
pub mod web;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::storage::config::{self, AppEnv, Config, EnvOverrides};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(version)]
#[command(about = "Minimal to-do list web app")]
pub struct Cli {
    /// Environment profile (overrides TODO_ENV)
    #[arg(long, global = true, value_enum)]
    pub env: Option<AppEnv>,
    /// Config file (defaults to ~/.todolist/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Database URL, e.g. sqlite:///local.db (overrides config and environment)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Web {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Open the browser after start
        #[arg(long)]
        open: bool,
    },
    /// Create or upgrade the database schema
    Migrate {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Check database connectivity
    Check,
}

impl Cli {
    /// 组装配置：环境档位 → 配置文件 → 环境变量 → 命令行
    pub fn load_config(&self, vars: &EnvOverrides) -> Result<Config> {
        let env = config::resolve_env(self.env, vars)?;
        let mut config = config::load(env, self.config.as_deref(), vars)?;

        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(Commands::Web { port, host, .. }) = &self.command {
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(host) = host {
                config.host = host.clone();
            }
        }
        Ok(config)
    }
}

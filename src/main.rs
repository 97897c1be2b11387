mod api;
mod cli;
mod error;
mod logging;
mod operations;
mod storage;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;
use storage::config::EnvOverrides;

fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 环境变量只在这里读取，之后以 Config 形式向下传递
    let vars = EnvOverrides::from_process();
    let config = match cli.load_config(&vars) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    logging::init(config.debug);

    if let Err(e) = run(cli.command, &config) {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// 统一调度，无子命令时启动 Web 服务
fn run(command: Option<Commands>, config: &storage::config::Config) -> Result<()> {
    match command.unwrap_or(Commands::Web {
        port: None,
        host: None,
        open: false,
    }) {
        Commands::Web { open, .. } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::web::execute(config, open))
        }
        Commands::Migrate { dry_run } => cli::migrate::execute(config, dry_run),
        Commands::Check => cli::check::execute(config),
    }
}

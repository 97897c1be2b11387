//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的规则
fn fallback_directives(debug: bool) -> &'static str {
    if debug {
        "todolist=debug,tower_http=debug,info"
    } else {
        "info"
    }
}

/// 默认过滤规则：`RUST_LOG` 优先，否则按调试开关选择 debug / info
pub fn default_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_directives(debug)))
}

/// 安装全局 subscriber，重复调用时忽略
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter(debug))
        .with_target(false)
        .try_init();
}

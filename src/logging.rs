//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 默认日志过滤规则（`RUST_LOG` 未设置时使用）
pub const DEFAULT_FILTER: &str = "wordweave=info";

/// 安装 fmt 订阅器；重复调用时保持已有的订阅器
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

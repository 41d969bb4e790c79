//! 日志初始化
//!
//! 基于 tracing-subscriber；`RUST_LOG` 优先于配置中的日志级别。

use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 安装全局 tracing subscriber
///
/// 重复调用是安全的：已有 subscriber 时静默忽略。
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    if config.log_to_file {
        let file = File::create(&config.log_file_path)?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if config.log_to_console {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    tracing::debug!(target: "zhuobu", level = ?config.level, "logging initialized");
    Ok(())
}

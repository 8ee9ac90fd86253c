//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制，输出到 stderr。

use std::io;

use strand_api::Phase;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LogConfig;

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 按阶段构建过滤目标
pub fn build_targets(log_config: &LogConfig) -> Targets {
    let mut targets = Targets::new()
        .with_default(log_config.global)
        .with_target("strand::cli", log_config.global);
    for phase in Phase::ALL {
        let target = phase.target();
        let level = log_config.level_for(&target);
        targets = targets.with_target(target, level);
    }
    targets
}

/// 使用指定格式和日志配置初始化日志系统
///
/// 已经安装过全局 subscriber 时保持原样。
pub fn init(log_config: &LogConfig, format: LogFormat) {
    let targets = build_targets(log_config);
    let layer = create_format_layer(format).with_filter(targets);
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Create formatter layer based on format
fn create_format_layer(format: LogFormat) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(io::stderr)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_api::LogLevel;
    use tracing::Level;

    #[test]
    fn test_targets_follow_phase_levels() {
        let cfg = LogConfig {
            parser: Some(Level::TRACE),
            ..LogConfig::with_global(LogLevel::Warn)
        };
        let targets = build_targets(&cfg);
        assert!(targets.would_enable("strand::parser", &Level::TRACE));
        assert!(!targets.would_enable("strand::vm", &Level::INFO));
        assert!(targets.would_enable("strand::vm", &Level::WARN));
        assert!(!targets.would_enable("somewhere_else", &Level::DEBUG));
    }
}

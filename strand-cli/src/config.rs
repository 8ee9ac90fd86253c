//! CLI 配置
//!
//! 包含 CLI 特有的配置：日志配置和项目文件

use serde::Deserialize;
use strand_api::{LimitConfig, LogLevel, VmConfig};
use tracing::Level;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub lexer: Option<Level>,
    pub parser: Option<Level>,
    pub compiler: Option<Level>,
    pub vm: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            lexer: None,
            parser: None,
            compiler: None,
            vm: None,
        }
    }
}

impl LogConfig {
    /// 所有阶段使用同一级别
    pub fn with_global(level: LogLevel) -> Self {
        Self {
            global: to_tracing_level(level),
            ..Self::default()
        }
    }

    /// Get log level for a specific target
    pub fn level_for(&self, target: &str) -> Level {
        match target {
            "strand::lexer" => self.lexer.unwrap_or(self.global),
            "strand::parser" => self.parser.unwrap_or(self.global),
            "strand::compiler" => self.compiler.unwrap_or(self.global),
            "strand::vm" => self.vm.unwrap_or(self.global),
            _ => self.global,
        }
    }
}

pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// package.json 结构
#[derive(Debug, Default, Deserialize)]
pub struct PackageJson {
    /// 入口文件路径（相对 package.json 所在目录）
    pub entry: String,
    /// 编译器配置
    pub compiler: Option<CompilerSection>,
    /// 执行限制
    #[serde(default)]
    pub limits: LimitConfig,
    /// 初始分配
    #[serde(default)]
    pub vm: VmConfig,
}

/// 编译器配置
#[derive(Debug, Default, Deserialize)]
pub struct CompilerSection {
    /// 是否仅编译，不执行
    pub compile_only: Option<bool>,
    /// 是否输出字节码（JSON 格式）
    pub dump_bytecode: Option<bool>,
    /// 是否显示源码
    pub show_source: Option<bool>,
    /// 是否只输出格式化后的源码
    pub format: Option<bool>,
    /// 日志级别: "silent", "error", "warn", "info", "debug", "trace"
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_falls_back_to_global() {
        let cfg = LogConfig {
            vm: Some(Level::TRACE),
            ..LogConfig::with_global(LogLevel::Info)
        };
        assert_eq!(cfg.level_for("strand::vm"), Level::TRACE);
        assert_eq!(cfg.level_for("strand::parser"), Level::INFO);
        assert_eq!(cfg.level_for("other"), Level::INFO);
    }

    #[test]
    fn test_default_is_warn() {
        assert_eq!(LogConfig::default().global, Level::WARN);
    }

    #[test]
    fn test_package_json() {
        let json = r#"{
            "entry": "src/main.strand",
            "compiler": { "dump_bytecode": true, "log_level": "debug" },
            "limits": { "max_call_depth": 64 }
        }"#;
        let package: PackageJson = serde_json::from_str(json).unwrap();
        assert_eq!(package.entry, "src/main.strand");
        let compiler = package.compiler.unwrap();
        assert_eq!(compiler.dump_bytecode, Some(true));
        assert_eq!(compiler.compile_only, None);
        assert_eq!(compiler.log_level.as_deref(), Some("debug"));
        assert_eq!(package.limits.max_call_depth, 64);
        assert_eq!(package.limits.max_operand_stack, 10240);
        assert_eq!(package.vm, VmConfig::default());
    }
}

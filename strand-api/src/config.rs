//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供 CLI 使用）

use once_cell::sync::OnceCell;
use strand_config::{LimitConfig, VmConfig};

/// Execution configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Whether to render the disassembly alongside the result
    pub dump_bytecode: bool,
    /// Capture `print` output into `ExecuteOutput::stdout` instead of writing to stdout
    pub capture_output: bool,
    /// Execution limits
    pub limits: LimitConfig,
    /// Initial allocation sizes
    pub vm: VmConfig,
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration
///
/// Returns the rejected config if one was already installed.
pub fn init(config: RunConfig) -> Result<(), RunConfig> {
    GLOBAL_CONFIG.set(config)
}

/// Get global config reference, if initialized
pub fn config() -> Option<&'static RunConfig> {
    GLOBAL_CONFIG.get()
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_config() {
        let cfg = RunConfig::default();
        assert!(!cfg.dump_bytecode);
        assert!(!cfg.capture_output);
        assert_eq!(cfg.limits.max_operand_stack, 10240);
        assert_eq!(cfg.limits.max_call_depth, 256);
        assert_eq!(cfg.vm.initial_stack_size, 256);
    }

    #[test]
    fn test_global_config_init_once() {
        let cfg = RunConfig {
            capture_output: true,
            ..RunConfig::default()
        };
        // 其他测试可能已经初始化过全局配置
        if init(cfg.clone()).is_ok() {
            assert_eq!(config(), Some(&cfg));
        }
        assert!(is_initialized());
        assert!(init(RunConfig::default()).is_err());
    }
}

//! Strand API - Execution orchestration layer
//!
//! Provides unified execution interface, including:
//! - Execution flow orchestration
//! - Configuration abstraction (RunConfig)
//! - Unified error handling (StrandError)
//!
//! For CLI convenience, this crate provides a global singleton API.
//! For library use, prefer the explicit `run(source, &config)` API.

use tracing::{debug, info};

use strand_core::compiler::{format_program, parse, tokenize};
use strand_core::{compile as compile_statements, Instruction, VM};

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};

// Re-export config types from strand_config
pub use strand_config::{LimitConfig, LogLevel, Phase, VmConfig};

// Re-export error and types
pub mod error;
pub mod types;
pub use error::{ErrorDetails, ErrorReport, LexerError, ParserError, RuntimeError, StrandError};
pub use types::{CompileOutput, ExecuteOutput};

// Re-export core types
pub use strand_config;
pub use strand_core::{RunSummary, Value};

/// Execute with explicit configuration
///
/// This is the recommended API for library users.
pub fn run(source: &str, config: &RunConfig) -> Result<ExecuteOutput, StrandError> {
    info!(target: "strand::vm", "Starting execution");

    let compiled = compile_with_config(source, config)?;

    let mut output = execute_with_config(compiled.instructions, config)?;
    output.disassembly = compiled.disassembly;

    info!(
        target: "strand::vm",
        halted = output.summary.halted,
        fibers_spawned = output.summary.fibers_spawned,
        blocked_fibers = output.summary.blocked_fibers,
        "Execution completed"
    );
    Ok(output)
}

/// Compile with explicit configuration
///
/// `dump_bytecode` 开启时同时生成反汇编文本。
pub fn compile_with_config(source: &str, config: &RunConfig) -> Result<CompileOutput, StrandError> {
    info!(target: "strand::compiler", "Starting compiler");

    let tokens = tokenize(source)?;
    debug!(target: "strand::lexer", tokens = tokens.len(), "Tokenized source");

    let statements = parse(tokens)?;
    debug!(target: "strand::parser", statements = statements.len(), "Parsed program");

    let instructions = compile_statements(&statements);
    info!(target: "strand::compiler", instructions = instructions.len(), "Compiler completed");

    let mut output = CompileOutput {
        statements,
        instructions,
        disassembly: None,
    };
    if config.dump_bytecode {
        let text = output.disassemble();
        debug!(target: "strand::compiler", "\n{}", text);
        output.disassembly = Some(text);
    }
    Ok(output)
}

/// Execute an instruction sequence with explicit configuration
pub fn execute_with_config(
    instructions: Vec<Instruction>,
    config: &RunConfig,
) -> Result<ExecuteOutput, StrandError> {
    let mut vm = VM::with_config(config.vm.clone(), config.limits.clone());
    let buffer = config.capture_output.then(|| vm.capture_output());

    let summary = vm.run(instructions)?;

    Ok(ExecuteOutput {
        summary,
        stdout: buffer.map(|b| b.contents()).unwrap_or_default(),
        disassembly: None,
    })
}

/// Parse and pretty-print source in canonical layout
pub fn format_source(source: &str) -> Result<String, StrandError> {
    let statements = parse(tokenize(source)?)?;
    Ok(format_program(&statements))
}

// ==================== Global config API ====================

fn global_or_default() -> RunConfig {
    get_config().cloned().unwrap_or_default()
}

/// Compile source code (uses global config, or defaults if not initialized)
pub fn compile(source: &str) -> Result<CompileOutput, StrandError> {
    compile_with_config(source, &global_or_default())
}

/// Compile and run (uses global config, or defaults if not initialized)
pub fn compile_and_run(source: &str) -> Result<ExecuteOutput, StrandError> {
    run(source, &global_or_default())
}

/// Quick run with default config (auto-initializes if needed)
pub fn quick_run(source: &str) -> Result<ExecuteOutput, StrandError> {
    if !is_initialized() {
        // 并发初始化时保留先到的配置
        let _ = init_config(RunConfig::default());
    }
    compile_and_run(source)
}

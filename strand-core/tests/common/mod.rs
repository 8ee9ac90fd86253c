//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数

#![allow(dead_code)]

use strand_core::{InterpretError, LimitConfig, RunSummary, RuntimeError, VmConfig, VM};

/// 执行结果
#[derive(Debug)]
pub struct ExecResult {
    pub summary: RunSummary,
    /// 捕获的 print 输出
    pub output: String,
}

/// 执行代码并捕获输出；出错时同样返回已产生的输出
pub fn run_capturing(code: &str) -> (Result<RunSummary, InterpretError>, String) {
    run_capturing_with(code, LimitConfig::default())
}

pub fn run_capturing_with(
    code: &str,
    limits: LimitConfig,
) -> (Result<RunSummary, InterpretError>, String) {
    let mut vm = VM::with_config(VmConfig::default(), limits);
    let output = vm.capture_output();
    let result = vm.run_source(code);
    (result, output.contents())
}

/// 执行代码（完整流程：词法 + 语法 + 编译 + 执行）
pub fn run_code(code: &str) -> Result<ExecResult, InterpretError> {
    let (result, output) = run_capturing(code);
    result.map(|summary| ExecResult { summary, output })
}

/// 执行代码并返回输出行
pub fn output_lines(code: &str) -> Vec<String> {
    let result = run_code(code).unwrap_or_else(|e| panic!("run failed: {e}\n{code}"));
    result.output.lines().map(str::to_string).collect()
}

/// 执行代码并返回运行时错误
pub fn runtime_error(code: &str) -> RuntimeError {
    match run_capturing(code).0 {
        Err(InterpretError::Runtime(err)) => err,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

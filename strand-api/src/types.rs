//! API 类型定义
//!
//! 编译和执行的输入输出类型。

use strand_core::compiler::parser::Stmt;
use strand_core::{disassemble, Instruction, RunSummary};

/// 编译输出
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// 语句树
    pub statements: Vec<Stmt>,
    /// 指令序列（不含 VM 追加的 `Exit`）
    pub instructions: Vec<Instruction>,
    /// 反汇编文本（开启 dump_bytecode 时）
    pub disassembly: Option<String>,
}

impl CompileOutput {
    /// 反汇编文本
    pub fn disassemble(&self) -> String {
        disassemble(&self.instructions, "main")
    }
}

/// 执行输出
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutput {
    /// 调度摘要
    pub summary: RunSummary,
    /// 捕获的输出（未开启捕获时为空）
    pub stdout: String,
    /// 反汇编文本（开启 dump_bytecode 时）
    pub disassembly: Option<String>,
}

//! Strand 运行时
//!
//! 指令集、字节码编译器、值模型、通道与 fiber 调度虚拟机。

/// 指令集与反汇编
pub mod bytecode;

/// 通道
pub mod channel;

/// 语句树编译器
pub mod compiler;

/// 运行时错误
pub mod error;

/// Fiber 与调用帧
pub mod fiber;

/// 对象
pub mod object;

/// 就绪队列与阻塞表
pub mod scheduler;

/// 原生函数
pub mod stdlib;

/// 值
pub mod value;

/// VM 实现
pub mod vm;

pub use compiler::{compile, compile_expression, Compiler};
pub use error::RuntimeError;
pub use value::Value;
pub use vm::{InterpretError, OutputBuffer, RunSummary, VM};

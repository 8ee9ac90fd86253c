//! Strand Core - Core compiler and fiber VM (pure logic, no file IO)
//!
//! Contains lexer, parser, formatter, bytecode compiler, and the cooperative
//! multi-fiber virtual machine.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod compiler;
pub mod runtime;

// Re-export common types
pub use runtime::bytecode::{disassemble, Instruction};
pub use runtime::compiler::{compile, compile_expression};
pub use runtime::error::RuntimeError;
pub use runtime::value::Value;
pub use runtime::vm::{InterpretError, OutputBuffer, RunSummary, VM};

// Re-export config types from strand-config
pub use strand_config::{LimitConfig, Phase, VmConfig};

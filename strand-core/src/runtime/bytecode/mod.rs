//! 字节码模块

pub mod disassembler;
pub mod instruction;

pub use disassembler::disassemble;
pub use instruction::Instruction;

//! 指令定义

use std::fmt;

use crate::runtime::value::Value;

/// VM 指令
///
/// 跳转偏移是带符号的指令条数，在 ip 越过跳转指令之后生效。
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // ===== 栈操作 =====
    Push(Value),
    Pop,

    // ===== 算术 =====
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Not,

    // ===== 比较 =====
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // ===== 变量 =====
    GetLocal(String),
    SetLocal(String),
    DeclareLocal(String),
    GetGlobal(String),
    SetGlobal(String),
    DeclareGlobal(String),

    // ===== 作用域 =====
    BlockStart,
    BlockEnd,

    // ===== 控制流 =====
    Jump(isize),
    JumpIfFalse(isize),
    Call(usize),
    Return,

    // ===== 并发 =====
    Spawn(usize),
    Yield,
    ChannelSend,
    ChannelReceive,

    // ===== 对象 =====
    AccessProperty(String),
    DefineProperty(String),

    Print,
    Exit,
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "PUSH",
            Instruction::Pop => "POP",
            Instruction::Add => "ADD",
            Instruction::Subtract => "SUBTRACT",
            Instruction::Multiply => "MULTIPLY",
            Instruction::Divide => "DIVIDE",
            Instruction::Negate => "NEGATE",
            Instruction::Not => "NOT",
            Instruction::Equal => "EQUAL",
            Instruction::NotEqual => "NOT_EQUAL",
            Instruction::LessThan => "LESS_THAN",
            Instruction::LessThanEqual => "LESS_THAN_EQUAL",
            Instruction::GreaterThan => "GREATER_THAN",
            Instruction::GreaterThanEqual => "GREATER_THAN_EQUAL",
            Instruction::GetLocal(_) => "GET_LOCAL",
            Instruction::SetLocal(_) => "SET_LOCAL",
            Instruction::DeclareLocal(_) => "DECLARE_LOCAL",
            Instruction::GetGlobal(_) => "GET_GLOBAL",
            Instruction::SetGlobal(_) => "SET_GLOBAL",
            Instruction::DeclareGlobal(_) => "DECLARE_GLOBAL",
            Instruction::BlockStart => "BLOCK_START",
            Instruction::BlockEnd => "BLOCK_END",
            Instruction::Jump(_) => "JUMP",
            Instruction::JumpIfFalse(_) => "JUMP_IF_FALSE",
            Instruction::Call(_) => "CALL",
            Instruction::Return => "RETURN",
            Instruction::Spawn(_) => "SPAWN",
            Instruction::Yield => "YIELD",
            Instruction::ChannelSend => "CHANNEL_SEND",
            Instruction::ChannelReceive => "CHANNEL_RECEIVE",
            Instruction::AccessProperty(_) => "ACCESS_PROPERTY",
            Instruction::DefineProperty(_) => "DEFINE_PROPERTY",
            Instruction::Print => "PRINT",
            Instruction::Exit => "EXIT",
        }
    }

    /// 操作数的文本形式；无操作数时为 None
    pub fn operand(&self) -> Option<String> {
        match self {
            Instruction::Push(value) => Some(value.repr()),
            Instruction::GetLocal(name)
            | Instruction::SetLocal(name)
            | Instruction::DeclareLocal(name)
            | Instruction::GetGlobal(name)
            | Instruction::SetGlobal(name)
            | Instruction::DeclareGlobal(name)
            | Instruction::AccessProperty(name)
            | Instruction::DefineProperty(name) => Some(name.clone()),
            Instruction::Jump(offset) | Instruction::JumpIfFalse(offset) => {
                Some(offset.to_string())
            }
            Instruction::Call(arity) | Instruction::Spawn(arity) => Some(arity.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{:<20} {}", self.name(), operand),
            None => write!(f, "{}", self.name()),
        }
    }
}

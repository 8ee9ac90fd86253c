//! 运行时错误
//!
//! 所有运行时错误都是致命的：调度循环立即停止，任何 fiber 都不会再恢复。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Arity mismatch: {name} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("Undefined property '{0}'")]
    UndefinedProperty(String),

    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Value of type {0} is not callable")]
    NotCallable(&'static str),

    #[error("Nothing to print: operand stack is empty")]
    EmptyPrint,

    #[error("Stack overflow: {0}")]
    StackOverflow(String),

    #[error("Native function '{name}' failed: {message}")]
    Native { name: String, message: String },

    #[error("Output error: {0}")]
    Output(String),

    #[error("Jump to {0} is out of range")]
    InvalidJump(isize),

    #[error("Call stack is empty")]
    CallStackEmpty,
}

impl RuntimeError {
    pub fn type_mismatch(operation: &str, found: &str) -> Self {
        RuntimeError::TypeMismatch(format!("cannot apply {operation} to {found}"))
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RuntimeError::ArityMismatch {
            name: "f".into(),
            expected: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "Arity mismatch: f expects 2 argument(s), got 1"
        );
        assert_eq!(
            RuntimeError::type_mismatch("'-'", "string").to_string(),
            "Type mismatch: cannot apply '-' to string"
        );
        assert_eq!(
            RuntimeError::NotCallable("number").to_string(),
            "Value of type number is not callable"
        );
    }
}

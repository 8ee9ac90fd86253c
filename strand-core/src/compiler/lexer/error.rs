//! Lexer 错误类型
//!
//! 提供结构化的词法错误信息，包含错误类型和位置。

use super::types::Coordinate;
use thiserror::Error;

/// 词法错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("Invalid character '{0}'")]
    InvalidChar(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
}

/// 词法错误，包含结构化信息
#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    /// 错误类型
    pub kind: LexerErrorKind,
    /// 错误发生的位置
    pub position: Coordinate,
}

impl LexerError {
    /// 在指定位置创建错误
    pub fn at(kind: LexerErrorKind, position: Coordinate) -> Self {
        Self { kind, position }
    }

    /// 获取行号（1-based）
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// 获取列号（1-based）
    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.position.line, self.position.column, self.kind
        )
    }
}

impl std::error::Error for LexerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_error_display() {
        let err = LexerError::at(LexerErrorKind::InvalidChar('@'), Coordinate { line: 3, column: 7 });
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
        assert_eq!(err.to_string(), "[3:7] Invalid character '@'");
    }
}

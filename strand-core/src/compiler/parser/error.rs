use crate::compiler::lexer::Coordinate;

/// 语法错误，包含位置信息
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    /// 错误类型
    pub kind: ParserErrorKind,
    /// 错误发生的位置
    pub location: ErrorLocation,
}

/// 错误位置信息
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    /// 特定位置
    At(Coordinate),
    /// 文件末尾
    Eof,
}

/// 语法错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorKind {
    /// 意外的token
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
    },
    /// 无效的数字格式
    InvalidNumberFormat(String),
    /// 缺少右括号
    MissingRightParen,
    /// 缺少右花括号
    MissingRightCurly,
    /// 意外的输入结束
    UnexpectedEndOfInput,
    /// 点号后需要标识符
    ExpectedIdentifierAfterDot,
    /// 期望标识符
    ExpectedIdentifier { found: String },
    /// 赋值目标既不是变量也不是属性
    InvalidAssignmentTarget,
    /// spawn 后面必须是函数调用
    SpawnRequiresCall,
    /// 保留但未实现的关键字
    ReservedKeyword(String),
}

impl ParserError {
    /// 在指定位置创建错误
    pub fn at(kind: ParserErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(Coordinate { line, column }),
        }
    }

    /// 在当前位置创建错误（从token获取位置）
    pub fn here(kind: ParserErrorKind, coordinate: Coordinate) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(coordinate),
        }
    }

    /// 在文件末尾创建错误
    pub fn at_eof(kind: ParserErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Eof,
        }
    }

    /// 获取行号（如果可用）
    pub fn line(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(coord) => Some(coord.line),
            ErrorLocation::Eof => None,
        }
    }

    /// 获取列号（如果可用）
    pub fn column(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(coord) => Some(coord.column),
            ErrorLocation::Eof => None,
        }
    }
}

impl std::fmt::Display for ParserErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserErrorKind::UnexpectedToken { found, expected } => {
                if expected.is_empty() {
                    write!(f, "Unexpected token '{found}'")
                } else {
                    write!(
                        f,
                        "Unexpected token '{}', expected: {}",
                        found,
                        expected.join(", ")
                    )
                }
            }
            ParserErrorKind::InvalidNumberFormat(s) => write!(f, "Invalid number format: '{s}'"),
            ParserErrorKind::MissingRightParen => write!(f, "Missing right parenthesis ')'"),
            ParserErrorKind::MissingRightCurly => write!(f, "Missing right curly brace '}}'"),
            ParserErrorKind::UnexpectedEndOfInput => write!(f, "Unexpected end of input"),
            ParserErrorKind::ExpectedIdentifierAfterDot => {
                write!(f, "Expected identifier after '.'")
            }
            ParserErrorKind::ExpectedIdentifier { found } => {
                write!(f, "Expected identifier, found: '{found}'")
            }
            ParserErrorKind::InvalidAssignmentTarget => write!(f, "Invalid assignment target"),
            ParserErrorKind::SpawnRequiresCall => {
                write!(f, "'spawn' must be followed by a function call")
            }
            ParserErrorKind::ReservedKeyword(word) => {
                write!(f, "'{word}' is reserved and not supported")
            }
        }
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location_prefix = match &self.location {
            ErrorLocation::At(coord) => format!("{}:{}", coord.line, coord.column),
            ErrorLocation::Eof => "EOF".to_string(),
        };
        write!(f, "[{location_prefix}] {}", self.kind)
    }
}

impl std::error::Error for ParserError {}

/// 解析结果类型
pub type ParseResult<T> = Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_at_location() {
        let err = ParserError::at(ParserErrorKind::MissingRightParen, 10, 5);
        assert_eq!(err.line(), Some(10));
        assert_eq!(err.column(), Some(5));
        assert!(matches!(err.kind, ParserErrorKind::MissingRightParen));
    }

    #[test]
    fn test_error_at_eof() {
        let err = ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
        assert_eq!(format!("{err}"), "[EOF] Unexpected end of input");
    }

    #[test]
    fn test_error_display_with_location() {
        let err = ParserError::at(
            ParserErrorKind::UnexpectedToken {
                found: ";".to_string(),
                expected: vec!["identifier".to_string()],
            },
            5,
            10,
        );
        assert_eq!(
            format!("{err}"),
            "[5:10] Unexpected token ';', expected: identifier"
        );
    }
}

//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use serde::Serialize;
use thiserror::Error;

use strand_core::compiler::lexer::LexerErrorKind;
use strand_core::compiler::parser::{ErrorLocation, ParserErrorKind};
use strand_core::InterpretError;

/// 词法错误（结构化）
pub use strand_core::compiler::lexer::LexerError;

/// 语法错误（结构化）
pub use strand_core::compiler::parser::ParserError;

/// 运行时错误
pub use strand_core::RuntimeError;

/// Strand 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrandError {
    /// 词法分析错误（结构化）
    #[error("{0}")]
    Lexer(#[from] LexerError),

    /// 语法分析错误（结构化）
    #[error("{0}")]
    Parser(#[from] ParserError),

    /// 运行时错误
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl From<InterpretError> for StrandError {
    fn from(err: InterpretError) -> Self {
        match err {
            InterpretError::Lexer(e) => StrandError::Lexer(e),
            InterpretError::Parser(e) => StrandError::Parser(e),
            InterpretError::Runtime(e) => StrandError::Runtime(e),
        }
    }
}

impl StrandError {
    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        match self {
            StrandError::Lexer(e) => Some(e.line()),
            StrandError::Parser(e) => e.line(),
            StrandError::Runtime(_) => None,
        }
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        match self {
            StrandError::Lexer(e) => Some(e.column()),
            StrandError::Parser(e) => e.column(),
            StrandError::Runtime(_) => None,
        }
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            StrandError::Lexer(_) => "lexer",
            StrandError::Parser(_) => "parser",
            StrandError::Runtime(_) => "runtime",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        match self {
            StrandError::Lexer(e) => ErrorReport {
                phase: "lexer",
                line: Some(e.line()),
                column: Some(e.column()),
                error_kind: lexer_kind_name(&e.kind).to_string(),
                message: e.kind.to_string(),
                details: None,
            },
            StrandError::Parser(e) => {
                let location_type = match &e.location {
                    ErrorLocation::At(_) => "at",
                    ErrorLocation::Eof => "eof",
                };
                ErrorReport {
                    phase: "parser",
                    line: e.line(),
                    column: e.column(),
                    error_kind: parser_kind_name(&e.kind).to_string(),
                    message: e.kind.to_string(),
                    details: Some(ErrorDetails::Location { location_type }),
                }
            }
            StrandError::Runtime(e) => ErrorReport {
                phase: "runtime",
                line: None,
                column: None,
                error_kind: runtime_kind_name(e).to_string(),
                message: e.to_string(),
                details: None,
            },
        }
    }
}

fn lexer_kind_name(kind: &LexerErrorKind) -> &'static str {
    match kind {
        LexerErrorKind::InvalidChar(_) => "InvalidChar",
        LexerErrorKind::UnterminatedString => "UnterminatedString",
        LexerErrorKind::InvalidEscape(_) => "InvalidEscape",
    }
}

fn parser_kind_name(kind: &ParserErrorKind) -> &'static str {
    match kind {
        ParserErrorKind::UnexpectedToken { .. } => "UnexpectedToken",
        ParserErrorKind::InvalidNumberFormat(_) => "InvalidNumberFormat",
        ParserErrorKind::MissingRightParen => "MissingRightParen",
        ParserErrorKind::MissingRightCurly => "MissingRightCurly",
        ParserErrorKind::UnexpectedEndOfInput => "UnexpectedEndOfInput",
        ParserErrorKind::ExpectedIdentifierAfterDot => "ExpectedIdentifierAfterDot",
        ParserErrorKind::ExpectedIdentifier { .. } => "ExpectedIdentifier",
        ParserErrorKind::InvalidAssignmentTarget => "InvalidAssignmentTarget",
        ParserErrorKind::SpawnRequiresCall => "SpawnRequiresCall",
        ParserErrorKind::ReservedKeyword(_) => "ReservedKeyword",
    }
}

fn runtime_kind_name(err: &RuntimeError) -> &'static str {
    match err {
        RuntimeError::TypeMismatch(_) => "TypeMismatch",
        RuntimeError::ArityMismatch { .. } => "ArityMismatch",
        RuntimeError::UndefinedVariable(_) => "UndefinedVariable",
        RuntimeError::UndefinedProperty(_) => "UndefinedProperty",
        RuntimeError::StackUnderflow => "StackUnderflow",
        RuntimeError::NotCallable(_) => "NotCallable",
        RuntimeError::EmptyPrint => "EmptyPrint",
        RuntimeError::StackOverflow(_) => "StackOverflow",
        RuntimeError::Native { .. } => "Native",
        RuntimeError::Output(_) => "Output",
        RuntimeError::InvalidJump(_) => "InvalidJump",
        RuntimeError::CallStackEmpty => "CallStackEmpty",
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、Web、LSP）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: lexer, parser, runtime
    pub phase: &'static str,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    pub column: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 额外详情（位置类型等）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// 错误额外详情
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorDetails {
    /// 位置相关信息
    Location { location_type: &'static str },
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "[{}:{}] {} error: {}", line, col, self.phase, self.message)
            }
            _ => write!(f, "{} error: {}", self.phase, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式（Web API 使用）
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "phase": self.phase, "message": e.to_string() }).to_string()
        })
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::compiler::lexer::Coordinate;

    #[test]
    fn test_lexer_error_line_column() {
        let lexer_err = LexerError::at(
            LexerErrorKind::InvalidChar('@'),
            Coordinate { line: 10, column: 5 },
        );
        let err = StrandError::Lexer(lexer_err);

        assert_eq!(err.line(), Some(10));
        assert_eq!(err.column(), Some(5));
        assert_eq!(err.phase(), "lexer");
        assert_eq!(err.to_report().error_kind, "InvalidChar");
    }

    #[test]
    fn test_parser_error_line_column() {
        let err = StrandError::Parser(ParserError::at(ParserErrorKind::MissingRightParen, 3, 7));

        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
        assert_eq!(err.phase(), "parser");

        let report = err.to_report();
        assert_eq!(
            report.details,
            Some(ErrorDetails::Location {
                location_type: "at"
            })
        );
        assert!(report.to_string().starts_with("[3:7] parser error: "));
    }

    #[test]
    fn test_parser_error_at_eof() {
        let err = StrandError::Parser(ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput));
        assert_eq!(err.line(), None);
        let report = err.to_report();
        assert_eq!(
            report.details,
            Some(ErrorDetails::Location {
                location_type: "eof"
            })
        );
    }

    #[test]
    fn test_runtime_error_report() {
        let err = StrandError::from(RuntimeError::UndefinedVariable("x".into()));
        let report = err.to_report();
        assert_eq!(report.phase, "runtime");
        assert_eq!(report.error_kind, "UndefinedVariable");
        assert_eq!(report.line, None);
        assert_eq!(report.to_string(), "runtime error: Undefined variable 'x'");
        assert_eq!(report.to_short(), "runtime: Undefined variable 'x'");
    }

    #[test]
    fn test_report_to_json() {
        let err = StrandError::Parser(ParserError::at(ParserErrorKind::SpawnRequiresCall, 1, 2));
        let json: serde_json::Value = serde_json::from_str(&err.to_report().to_json()).unwrap();
        assert_eq!(json["phase"], "parser");
        assert_eq!(json["line"], 1);
        assert_eq!(json["column"], 2);
        assert_eq!(json["error_kind"], "SpawnRequiresCall");
        assert_eq!(json["details"]["kind"], "location");
        assert_eq!(json["details"]["location_type"], "at");

        let json: serde_json::Value = serde_json::from_str(
            &StrandError::Runtime(RuntimeError::EmptyPrint).to_report().to_json(),
        )
        .unwrap();
        assert!(json["line"].is_null());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_from_interpret_error() {
        let err = StrandError::from(InterpretError::Runtime(RuntimeError::StackUnderflow));
        assert_eq!(err, StrandError::Runtime(RuntimeError::StackUnderflow));
    }
}

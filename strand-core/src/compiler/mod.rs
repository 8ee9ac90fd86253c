//! 前端：词法分析、语法分析与源码格式化

pub mod formatter;
pub mod lexer;
pub mod parser;

pub use formatter::format_program;
pub use lexer::{tokenize, LexerError};
pub use parser::{parse, ParserError};

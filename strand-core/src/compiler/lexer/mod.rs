//! Strand 词法分析器

pub mod error;
pub mod lexer;
pub mod token_kind;
pub mod types;

pub use error::{LexerError, LexerErrorKind};
pub use lexer::{tokenize, Lexer, Token};
pub use token_kind::TokenKind;
pub use types::{Coordinate, Span};

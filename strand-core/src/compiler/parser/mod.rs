pub mod error;
pub mod expr;
pub mod parser;
pub mod stmt;
mod utils;

// 重新导出常用类型
pub use error::{ErrorLocation, ParseResult, ParserError, ParserErrorKind};
pub use expr::{Expr, ExprKind};
pub use parser::{parse, Parser};
pub use stmt::{AssignTarget, Stmt, StmtKind};
pub(crate) use utils::{get_precedence, UNARY_PRECEDENCE};

use crate::compiler::lexer::TokenKind;

/// 二元运算符优先级；0 表示不是二元运算符
pub fn get_precedence(op: TokenKind) -> i32 {
    match op {
        TokenKind::DoubleEqual
        | TokenKind::ExclamationEqual
        | TokenKind::GreaterThan
        | TokenKind::LessThan
        | TokenKind::GreaterThanEqual
        | TokenKind::LessThanEqual => 100,
        TokenKind::Plus | TokenKind::Minus => 200,
        TokenKind::Asterisk | TokenKind::Slash => 300,
        _ => 0,
    }
}

/// 一元运算符与后缀运算的优先级，高于所有二元运算符
pub const UNARY_PRECEDENCE: i32 = 400;

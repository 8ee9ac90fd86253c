//! Strand Token 类型定义

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // 关键字
    Let = 0,
    Fun,
    If,
    Else,
    While,
    Return,
    Print,
    Yield,
    Spawn,
    True,
    False,
    Nil,
    And,
    Or,

    // 字面量
    LiteralNumber = 100,
    LiteralString,

    // 标识符
    Identifier = 120,

    // 双字符符号
    DoubleEqual = 130,
    ExclamationEqual,
    GreaterThanEqual,
    LessThanEqual,
    LeftArrow,
    RightArrow,

    // 单字符符号
    GreaterThan = 150,
    LessThan,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Exclamation,
    Colon,
    Equal,
    Comma,
    Semicolon,
    LeftParenthesis,
    RightParenthesis,
    LeftCurlyBrace,
    RightCurlyBrace,
    Dot,
}

impl TokenKind {
    /// 关键字查找
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "let" => TokenKind::Let,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "print" => TokenKind::Print,
            "yield" => TokenKind::Yield,
            "spawn" => TokenKind::Spawn,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        (self as u8) < 100
    }

    /// 符号和关键字的源码文本
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Let => "let",
            TokenKind::Fun => "fun",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Print => "print",
            TokenKind::Yield => "yield",
            TokenKind::Spawn => "spawn",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Nil => "nil",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::LiteralNumber => "number",
            TokenKind::LiteralString => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::DoubleEqual => "==",
            TokenKind::ExclamationEqual => "!=",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::LessThanEqual => "<=",
            TokenKind::LeftArrow => "<-",
            TokenKind::RightArrow => "->",
            TokenKind::GreaterThan => ">",
            TokenKind::LessThan => "<",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Exclamation => "!",
            TokenKind::Colon => ":",
            TokenKind::Equal => "=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftCurlyBrace => "{",
            TokenKind::RightCurlyBrace => "}",
            TokenKind::Dot => ".",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("spawn"), Some(TokenKind::Spawn));
        assert_eq!(TokenKind::keyword("yield"), Some(TokenKind::Yield));
        assert_eq!(TokenKind::keyword("channel"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(TokenKind::Or.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::LeftArrow.is_keyword());
    }
}

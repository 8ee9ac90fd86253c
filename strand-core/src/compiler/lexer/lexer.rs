//! 手写扫描器：源码文本 -> Token 序列

use super::error::{LexerError, LexerErrorKind};
use super::token_kind::TokenKind;
use super::types::{Coordinate, Span};
use tracing::{debug, trace};

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 源码文本；字符串字面量保存转义后的内容
    pub text: String,
}

/// Strand 词法分析器
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        trace!(target: "strand::lexer", bytes = source.len(), "Creating new Lexer");
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// 跳过空白和 `//` 注释
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek_next() == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// 获取下一个 Token，输入结束时返回 `Ok(None)`
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_trivia();
        let start = self.coordinate();
        let Some(c) = self.advance() else {
            return Ok(None);
        };

        let (kind, text) = match c {
            '0'..='9' => (TokenKind::LiteralNumber, self.scan_number(c)),
            c if c.is_alphabetic() || c == '_' => {
                let word = self.scan_word(c);
                let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier);
                (kind, word)
            }
            '"' => (TokenKind::LiteralString, self.scan_string(start)?),
            _ => {
                let kind = self.scan_symbol(c).ok_or_else(|| {
                    LexerError::at(LexerErrorKind::InvalidChar(c), start)
                })?;
                (kind, kind.as_str().to_string())
            }
        };

        let token = Token {
            kind,
            span: Span::new(start, self.coordinate()),
            text,
        };
        trace!(
            target: "strand::lexer",
            kind = ?token.kind,
            text = %token.text,
            line = start.line,
            column = start.column,
            "Produced token"
        );
        Ok(Some(token))
    }

    fn scan_number(&mut self, first: char) -> String {
        let mut text = String::from(first);
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            text.push('.');
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn scan_word(&mut self, first: char) -> String {
        let mut text = String::from(first);
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            text.push(c);
            self.advance();
        }
        text
    }

    fn scan_string(&mut self, start: Coordinate) -> Result<String, LexerError> {
        let mut value = String::new();
        loop {
            let escape_at = self.coordinate();
            match self.advance() {
                None => return Err(LexerError::at(LexerErrorKind::UnterminatedString, start)),
                Some('"') => return Ok(value),
                Some('\\') => {
                    let escaped = match self.advance() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some(other) => {
                            return Err(LexerError::at(
                                LexerErrorKind::InvalidEscape(other),
                                escape_at,
                            ))
                        }
                        None => {
                            return Err(LexerError::at(LexerErrorKind::UnterminatedString, start))
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn scan_symbol(&mut self, c: char) -> Option<TokenKind> {
        let kind = match c {
            '=' if self.match_char('=') => TokenKind::DoubleEqual,
            '=' => TokenKind::Equal,
            '!' if self.match_char('=') => TokenKind::ExclamationEqual,
            '!' => TokenKind::Exclamation,
            '<' if self.match_char('=') => TokenKind::LessThanEqual,
            '<' if self.match_char('-') => TokenKind::LeftArrow,
            '<' => TokenKind::LessThan,
            '>' if self.match_char('=') => TokenKind::GreaterThanEqual,
            '>' => TokenKind::GreaterThan,
            '-' if self.match_char('>') => TokenKind::RightArrow,
            '-' => TokenKind::Minus,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            '{' => TokenKind::LeftCurlyBrace,
            '}' => TokenKind::RightCurlyBrace,
            '.' => TokenKind::Dot,
            _ => return None,
        };
        Some(kind)
    }
}

/// 将整段源码切分为 Token 序列
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    debug!(target: "strand::lexer", count = tokens.len(), "Tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex_all(input).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_lexer_tokenizes_keywords() {
        let tokens = lex_all("let fun if else while return print yield spawn true false nil");
        let expected = [
            TokenKind::Let,
            TokenKind::Fun,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Print,
            TokenKind::Yield,
            TokenKind::Spawn,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Nil,
        ];
        assert_eq!(tokens.len(), expected.len());
        for (i, kind) in expected.iter().enumerate() {
            assert_eq!(tokens[i].0, *kind, "Token {} kind mismatch", i);
            assert_eq!(tokens[i].1, kind.as_str());
        }
    }

    #[test]
    fn test_lexer_tokenizes_operators() {
        assert_eq!(
            kinds("+ - * / == != <= >= = < > ! <- ->"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Asterisk,
                TokenKind::Slash,
                TokenKind::DoubleEqual,
                TokenKind::ExclamationEqual,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::Equal,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Exclamation,
                TokenKind::LeftArrow,
                TokenKind::RightArrow,
            ]
        );
    }

    #[test]
    fn test_arrow_is_greedy() {
        assert_eq!(
            kinds("ch <- 1"),
            vec![TokenKind::Identifier, TokenKind::LeftArrow, TokenKind::LiteralNumber]
        );
        assert_eq!(
            kinds("a < -1"),
            vec![
                TokenKind::Identifier,
                TokenKind::LessThan,
                TokenKind::Minus,
                TokenKind::LiteralNumber
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            lex_all("42 3.25"),
            vec![
                (TokenKind::LiteralNumber, "42".to_string()),
                (TokenKind::LiteralNumber, "3.25".to_string()),
            ]
        );
        // 点号后不是数字时不属于数字
        assert_eq!(
            kinds("1.a"),
            vec![TokenKind::LiteralNumber, TokenKind::Dot, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex_all(r#""a\n\t\"b\\""#);
        assert_eq!(tokens, vec![(TokenKind::LiteralString, "a\n\t\"b\\".to_string())]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("let x = 1 // trailing\n// whole line\nprint x"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::LiteralNumber,
                TokenKind::Print,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = tokenize("let a\n  print a").unwrap();
        assert_eq!(tokens[0].span.start, Coordinate { line: 1, column: 1 });
        assert_eq!(tokens[1].span.start, Coordinate { line: 1, column: 5 });
        assert_eq!(tokens[2].span.start, Coordinate { line: 2, column: 3 });
        assert_eq!(tokens[2].span.end, Coordinate { line: 2, column: 8 });
    }

    #[test]
    fn test_invalid_char() {
        let err = tokenize("let a = @").unwrap_err();
        assert_eq!(err.kind, LexerErrorKind::InvalidChar('@'));
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 9);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print \"abc").unwrap_err();
        assert_eq!(err.kind, LexerErrorKind::UnterminatedString);
        assert_eq!(err.column(), 7);
    }

    #[test]
    fn test_invalid_escape() {
        let err = tokenize(r#""a\q""#).unwrap_err();
        assert_eq!(err.kind, LexerErrorKind::InvalidEscape('q'));
        assert_eq!(err.column(), 3);
    }
}

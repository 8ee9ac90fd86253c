use super::error::{ErrorLocation, ParseResult, ParserError, ParserErrorKind};
use super::expr::{
    BinaryOp, Expr, ExprKind, FunctionCall, Grouping, Lambda, LiteralFalse, LiteralNil, LiteralNumber,
    LiteralString, LiteralTrue, MemberAccess, ObjectLiteral, Receive, Unary, UnaryOp, VarRef,
};
use super::stmt::{
    AssignStmt, AssignTarget, BlockStmt, ExprStmt, FunctionDeclStmt, IfStmt, PrintStmt,
    ReturnStmt, SendStmt, SpawnStmt, Stmt, StmtKind, VarDeclStmt, WhileStmt, YieldStmt,
};
use super::utils::get_precedence;
use crate::compiler::lexer::{Coordinate, Token, TokenKind};
use tracing::{debug, trace};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 解析整个程序（顶层语句集合）
    pub fn parse(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while self.current_token().is_some() {
            // 跳过分号（空语句）
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        debug!(target: "strand::parser", statements = statements.len(), "Parsed program");
        Ok(statements)
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// 消费当前token
    fn consume(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// 检查当前token是否为指定类型
    fn check(&self, kind: TokenKind) -> bool {
        self.current_token()
            .map(|token| token.kind == kind)
            .unwrap_or(false)
    }

    /// 检查下一个token是否为指定类型
    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.position + 1)
            .map(|token| token.kind == kind)
            .unwrap_or(false)
    }

    /// 匹配并消费指定类型的token
    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn current_coordinate(&self) -> Option<Coordinate> {
        self.current_token().map(|t| t.span.start)
    }

    /// 获取当前token的位置信息
    fn current_location(&self) -> ErrorLocation {
        match self.current_coordinate() {
            Some(coord) => ErrorLocation::At(coord),
            None => ErrorLocation::Eof,
        }
    }

    /// 获取当前token的文本表示
    fn current_token_text(&self) -> String {
        match self.current_token() {
            Some(token) if token.kind == TokenKind::LiteralString => format!("\"{}\"", token.text),
            Some(token) => token.text.clone(),
            None => "EOF".to_string(),
        }
    }

    /// 创建带有当前位置的错误
    fn error_here(&self, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            location: self.current_location(),
        }
    }

    fn unexpected(&self, expected: &[&str]) -> ParserError {
        if self.current_token().is_none() {
            return ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput);
        }
        self.error_here(ParserErrorKind::UnexpectedToken {
            found: self.current_token_text(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// 期望并消费指定类型的token，否则返回错误
    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&[kind.as_str()]))
        }
    }

    /// 期望一个标识符，返回其名称
    fn expect_identifier(&mut self) -> ParseResult<String> {
        let token = self
            .current_token()
            .ok_or_else(|| ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput))?;

        if token.kind == TokenKind::Identifier {
            let name = token.text.clone();
            self.consume();
            Ok(name)
        } else {
            Err(self.error_here(ParserErrorKind::ExpectedIdentifier {
                found: self.current_token_text(),
            }))
        }
    }

    /// 解析单个语句
    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let Some(token) = self.current_token() else {
            return Err(ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput));
        };
        let kind = token.kind;
        trace!(target: "strand::parser", ?kind, "Parsing statement");

        let stmt = match kind {
            TokenKind::LeftCurlyBrace => self.parse_block()?,
            TokenKind::Let => self.parse_var_declaration()?,
            TokenKind::Fun if self.check_next(TokenKind::Identifier) => {
                self.parse_function_declaration()?
            }
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::While => self.parse_while_loop()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Print => {
                self.consume();
                let expression = self.parse_expression(0)?;
                Box::new(StmtKind::Print(PrintStmt { expression }))
            }
            TokenKind::Spawn => self.parse_spawn_statement()?,
            TokenKind::Yield => {
                self.consume();
                Box::new(StmtKind::Yield(YieldStmt))
            }
            _ => self.parse_expression_statement()?,
        };

        // 消费可选的分号
        self.match_token(TokenKind::Semicolon);
        Ok(stmt)
    }

    /// 表达式语句、赋值语句与发送语句共享同一个前缀
    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression(0)?;

        if self.check(TokenKind::Equal) {
            let target = match *expr {
                ExprKind::VarRef(var) => AssignTarget::Variable(var.name),
                ExprKind::MemberAccess(access) => AssignTarget::Property {
                    object: access.object,
                    member: access.member,
                },
                _ => return Err(self.error_here(ParserErrorKind::InvalidAssignmentTarget)),
            };
            self.consume();
            let value = self.parse_expression(0)?;
            return Ok(Box::new(StmtKind::Assign(AssignStmt { target, value })));
        }

        if self.match_token(TokenKind::LeftArrow) {
            let value = self.parse_expression(0)?;
            return Ok(Box::new(StmtKind::Send(SendStmt {
                channel: expr,
                value,
            })));
        }

        Ok(Box::new(StmtKind::Expr(ExprStmt { expression: expr })))
    }

    /// 解析代码块
    fn parse_block(&mut self) -> ParseResult<Stmt> {
        let statements = self.parse_block_statements()?;
        Ok(Box::new(StmtKind::Block(BlockStmt { statements })))
    }

    fn parse_block_statements(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LeftCurlyBrace)?;

        let mut statements = Vec::new();
        while self.current_token().is_some() && !self.check(TokenKind::RightCurlyBrace) {
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        if !self.match_token(TokenKind::RightCurlyBrace) {
            return Err(ParserError::at_eof(ParserErrorKind::MissingRightCurly));
        }
        Ok(statements)
    }

    /// 解析变量声明
    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        self.consume(); // 消费 'let'
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equal)?;
        let initializer = self.parse_expression(0)?;
        Ok(Box::new(StmtKind::VarDecl(VarDeclStmt { name, initializer })))
    }

    /// 解析具名函数声明
    fn parse_function_declaration(&mut self) -> ParseResult<Stmt> {
        self.consume(); // 消费 'fun'
        let name = self.expect_identifier()?;
        let params = self.parse_parameters()?;
        let body = self.parse_block_statements()?;
        Ok(Box::new(StmtKind::FunctionDecl(FunctionDeclStmt {
            name,
            params,
            body,
        })))
    }

    /// 解析参数列表 `(a, b)`
    fn parse_parameters(&mut self) -> ParseResult<Vec<String>> {
        self.expect(TokenKind::LeftParenthesis)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.match_token(TokenKind::RightParenthesis) {
            return Err(self.error_here(ParserErrorKind::MissingRightParen));
        }
        Ok(params)
    }

    /// 解析if语句，`else if` 递归成嵌套的 If
    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(); // 消费 'if'
        let condition = self.parse_expression(0)?;
        let then_body = self.parse_block()?;

        let else_body = if self.match_token(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(self.parse_if_statement()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Box::new(StmtKind::If(IfStmt {
            condition,
            then_body,
            else_body,
        })))
    }

    /// 解析while循环
    fn parse_while_loop(&mut self) -> ParseResult<Stmt> {
        self.consume(); // 消费 'while'
        let condition = self.parse_expression(0)?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::While(WhileStmt { condition, body })))
    }

    /// 解析return语句，省略返回值时返回 nil
    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(); // 消费 'return'

        let value = if self.current_token().is_none()
            || self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RightCurlyBrace)
        {
            None
        } else {
            Some(self.parse_expression(0)?)
        };

        Ok(Box::new(StmtKind::Return(ReturnStmt { value })))
    }

    /// 解析spawn语句，目标必须是一次函数调用
    fn parse_spawn_statement(&mut self) -> ParseResult<Stmt> {
        let spawn_at = self.current_location();
        self.consume(); // 消费 'spawn'

        let expr = self.parse_expression(0)?;
        match *expr {
            ExprKind::FunctionCall(call) => Ok(Box::new(StmtKind::Spawn(SpawnStmt {
                callee: call.function_expr,
                arguments: call.arguments,
            }))),
            _ => Err(ParserError {
                kind: ParserErrorKind::SpawnRequiresCall,
                location: spawn_at,
            }),
        }
    }

    /// 解析表达式（Pratt解析核心）
    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.current_token() {
            let op_precedence = get_precedence(token.kind);

            // 优先级不足，停止解析
            if op_precedence <= min_precedence {
                break;
            }
            let Some(op) = BinaryOp::from_token(token.kind) else {
                break;
            };
            self.consume();

            // 所有二元运算符都是左结合
            let right = self.parse_expression(op_precedence)?;
            left = ExprKind::binary(left, op, right);
        }

        Ok(left)
    }

    /// 解析一元表达式（`-x`、`!x`、`<-ch`）
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let unary_op = if self.check(TokenKind::Minus) {
            Some(UnaryOp::Negate)
        } else if self.check(TokenKind::Exclamation) {
            Some(UnaryOp::Not)
        } else {
            None
        };

        if let Some(op) = unary_op {
            self.consume();
            let operand = self.parse_unary()?;
            Ok(Box::new(ExprKind::Unary(Unary { op, operand })))
        } else if self.match_token(TokenKind::LeftArrow) {
            let channel = self.parse_unary()?;
            Ok(Box::new(ExprKind::Receive(Receive { channel })))
        } else {
            let base = self.parse_primary()?;
            self.parse_postfix(base)
        }
    }

    /// 解析基础表达式（无后缀）
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self
            .current_token()
            .ok_or_else(|| ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput))?;

        match token.kind {
            TokenKind::LiteralNumber => self.parse_number(),
            TokenKind::LiteralString => {
                let value = token.text.clone();
                self.consume();
                Ok(Box::new(ExprKind::LiteralString(LiteralString { value })))
            }
            TokenKind::True => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralTrue(LiteralTrue)))
            }
            TokenKind::False => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralFalse(LiteralFalse)))
            }
            TokenKind::Nil => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralNil(LiteralNil)))
            }
            TokenKind::LeftParenthesis => self.parse_parenthesized(),
            TokenKind::Identifier => {
                let name = token.text.clone();
                self.consume();
                Ok(Box::new(ExprKind::VarRef(VarRef { name })))
            }
            TokenKind::Fun => self.parse_lambda(),
            TokenKind::LeftCurlyBrace => self.parse_object_literal(),
            TokenKind::And | TokenKind::Or => Err(self.error_here(
                ParserErrorKind::ReservedKeyword(token.kind.as_str().to_string()),
            )),
            _ => Err(self.unexpected(&["expression"])),
        }
    }

    /// 解析后缀表达式（成员访问、函数调用）
    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            if self.match_token(TokenKind::Dot) {
                let member = match self.current_token() {
                    Some(token) if token.kind == TokenKind::Identifier => token.text.clone(),
                    _ => return Err(self.error_here(ParserErrorKind::ExpectedIdentifierAfterDot)),
                };
                self.consume();
                expr = Box::new(ExprKind::MemberAccess(MemberAccess {
                    object: expr,
                    member,
                }));
            } else if self.check(TokenKind::LeftParenthesis) {
                expr = self.parse_function_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// 解析数字字面量
    fn parse_number(&mut self) -> ParseResult<Expr> {
        let coord = self.current_coordinate().unwrap_or_default();
        let text = self.current_token_text();
        let value = text
            .parse::<f64>()
            .map_err(|_| ParserError::here(ParserErrorKind::InvalidNumberFormat(text.clone()), coord))?;
        self.consume();
        Ok(Box::new(ExprKind::LiteralNumber(LiteralNumber { value })))
    }

    /// 解析括号表达式
    fn parse_parenthesized(&mut self) -> ParseResult<Expr> {
        self.consume(); // 消费 '('
        let expression = self.parse_expression(0)?;
        if !self.match_token(TokenKind::RightParenthesis) {
            return Err(self.error_here(ParserErrorKind::MissingRightParen));
        }
        Ok(Box::new(ExprKind::Grouping(Grouping { expression })))
    }

    /// 解析匿名函数 `fun (a, b) { ... }`
    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        self.consume(); // 消费 'fun'
        let params = self.parse_parameters()?;
        let body = self.parse_block_statements()?;
        Ok(Box::new(ExprKind::Lambda(Lambda { params, body })))
    }

    /// 解析对象字面量 `{a: 1, "b": 2}`
    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        self.consume(); // 消费 '{'

        let mut properties = Vec::new();
        while !self.check(TokenKind::RightCurlyBrace) {
            let key = match self.current_token() {
                Some(token)
                    if token.kind == TokenKind::Identifier
                        || token.kind == TokenKind::LiteralString =>
                {
                    token.text.clone()
                }
                _ => return Err(self.unexpected(&["identifier", "string"])),
            };
            self.consume();
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression(0)?;
            properties.push((key, value));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        if !self.match_token(TokenKind::RightCurlyBrace) {
            return Err(self.error_here(ParserErrorKind::MissingRightCurly));
        }
        Ok(Box::new(ExprKind::ObjectLiteral(ObjectLiteral { properties })))
    }

    /// 解析函数调用
    fn parse_function_call(&mut self, function_expr: Expr) -> ParseResult<Expr> {
        self.consume(); // 消费 '('

        let mut arguments = Vec::new();
        while !self.check(TokenKind::RightParenthesis) {
            arguments.push(self.parse_expression(0)?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        if !self.match_token(TokenKind::RightParenthesis) {
            return Err(self.error_here(ParserErrorKind::MissingRightParen));
        }

        Ok(Box::new(ExprKind::FunctionCall(FunctionCall {
            function_expr,
            arguments,
        })))
    }
}

/// 将 Token 序列解析为语句列表
pub fn parse(tokens: Vec<Token>) -> ParseResult<Vec<Stmt>> {
    Parser::new(tokens).parse()
}

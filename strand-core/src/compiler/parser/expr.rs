use super::stmt::Stmt;
use crate::compiler::lexer::TokenKind;

// 表达式类型别名
pub type Expr = Box<ExprKind>;

/// 解析器表达式枚举
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // 数字字面量
    LiteralNumber(LiteralNumber),
    // 字符串字面量
    LiteralString(LiteralString),
    // 布尔true字面量
    LiteralTrue(LiteralTrue),
    // 布尔false字面量
    LiteralFalse(LiteralFalse),
    // nil字面量
    LiteralNil(LiteralNil),
    // 二元运算符表达式
    Binary(Binary),
    // 一元运算符表达式
    Unary(Unary),
    // 括号表达式
    Grouping(Grouping),
    // 变量引用表达式
    VarRef(VarRef),
    // 函数调用表达式
    FunctionCall(FunctionCall),
    // 成员访问表达式
    MemberAccess(MemberAccess),
    // 对象字面量（如 {a: 1, b: 2}）
    ObjectLiteral(ObjectLiteral),
    // 匿名函数表达式
    Lambda(Lambda),
    // 通道接收表达式（如 <-ch）
    Receive(Receive),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNumber {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralString {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralTrue;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralFalse;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralNil;

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Asterisk => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::DoubleEqual => BinaryOp::Equal,
            TokenKind::ExclamationEqual => BinaryOp::NotEqual,
            TokenKind::LessThan => BinaryOp::Less,
            TokenKind::LessThanEqual => BinaryOp::LessEqual,
            TokenKind::GreaterThan => BinaryOp::Greater,
            TokenKind::GreaterThanEqual => BinaryOp::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> TokenKind {
        match self {
            BinaryOp::Add => TokenKind::Plus,
            BinaryOp::Subtract => TokenKind::Minus,
            BinaryOp::Multiply => TokenKind::Asterisk,
            BinaryOp::Divide => TokenKind::Slash,
            BinaryOp::Equal => TokenKind::DoubleEqual,
            BinaryOp::NotEqual => TokenKind::ExclamationEqual,
            BinaryOp::Less => TokenKind::LessThan,
            BinaryOp::LessEqual => TokenKind::LessThanEqual,
            BinaryOp::Greater => TokenKind::GreaterThan,
            BinaryOp::GreaterEqual => TokenKind::GreaterThanEqual,
        }
    }
}

/// 一元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn token(self) -> TokenKind {
        match self {
            UnaryOp::Negate => TokenKind::Minus,
            UnaryOp::Not => TokenKind::Exclamation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function_expr: Expr,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub object: Expr,
    pub member: String,
}

/// 属性按源码顺序保存
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteral {
    pub properties: Vec<(String, Expr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receive {
    pub channel: Expr,
}

impl ExprKind {
    pub fn number(value: f64) -> Expr {
        Box::new(ExprKind::LiteralNumber(LiteralNumber { value }))
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Box::new(ExprKind::LiteralString(LiteralString {
            value: value.into(),
        }))
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Box::new(ExprKind::VarRef(VarRef { name: name.into() }))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Box::new(ExprKind::Binary(Binary { left, op, right }))
    }

    pub fn call(function_expr: Expr, arguments: Vec<Expr>) -> Expr {
        Box::new(ExprKind::FunctionCall(FunctionCall {
            function_expr,
            arguments,
        }))
    }
}

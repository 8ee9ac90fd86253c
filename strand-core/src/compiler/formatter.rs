//! 源码格式化器
//!
//! 将语句树输出为规范源码：两空格缩进、每行一条语句、简单语句以 `;` 结尾，
//! 只在恢复优先级需要时添加括号。

use super::lexer::TokenKind;
use super::parser::expr::{Expr, ExprKind};
#[cfg(test)]
use super::parser::expr::BinaryOp;
use super::parser::stmt::{AssignTarget, IfStmt, Stmt, StmtKind};
use super::parser::{get_precedence, UNARY_PRECEDENCE};
use crate::runtime::value::format_number;

/// 基础表达式与后缀表达式的优先级
const POSTFIX_PRECEDENCE: i32 = 500;

/// 格式化整个程序
pub fn format_program(statements: &[Stmt]) -> String {
    let mut formatter = Formatter::new(0);
    for stmt in statements {
        formatter.stmt(stmt);
    }
    formatter.output
}

/// 格式化单个表达式
pub fn format_expression(expr: &Expr) -> String {
    Formatter::new(0).expr(expr)
}

struct Formatter {
    output: String,
    indent: usize,
}

impl Formatter {
    fn new(indent: usize) -> Self {
        Self {
            output: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &**stmt {
            StmtKind::Expr(s) => {
                let text = format!("{};", self.expr(&s.expression));
                self.line(&text);
            }
            StmtKind::Block(block) => {
                if block.statements.is_empty() {
                    self.line("{}");
                } else {
                    self.line("{");
                    self.statements(&block.statements);
                    self.line("}");
                }
            }
            StmtKind::VarDecl(decl) => {
                let text = format!("let {} = {};", decl.name, self.expr(&decl.initializer));
                self.line(&text);
            }
            StmtKind::Assign(assign) => {
                let target = match &assign.target {
                    AssignTarget::Variable(name) => name.clone(),
                    AssignTarget::Property { object, member } => {
                        format!("{}.{}", self.expr_at(object, POSTFIX_PRECEDENCE), member)
                    }
                };
                let text = format!("{} = {};", target, self.expr(&assign.value));
                self.line(&text);
            }
            StmtKind::If(stmt) => self.if_chain(stmt, "if"),
            StmtKind::While(stmt) => {
                let header = format!("while {} {{", self.expr(&stmt.condition));
                self.braced(&header, &stmt.body);
            }
            StmtKind::Return(stmt) => match &stmt.value {
                Some(value) => {
                    let text = format!("return {};", self.expr(value));
                    self.line(&text);
                }
                None => self.line("return;"),
            },
            StmtKind::Print(stmt) => {
                let text = format!("print {};", self.expr(&stmt.expression));
                self.line(&text);
            }
            StmtKind::Spawn(stmt) => {
                let text = format!(
                    "spawn {}({});",
                    self.expr_at(&stmt.callee, POSTFIX_PRECEDENCE),
                    self.arguments(&stmt.arguments)
                );
                self.line(&text);
            }
            StmtKind::Yield(_) => self.line("yield;"),
            StmtKind::Send(stmt) => {
                let text = format!("{} <- {};", self.expr(&stmt.channel), self.expr(&stmt.value));
                self.line(&text);
            }
            StmtKind::FunctionDecl(decl) => {
                let header = format!("fun {}({})", decl.name, decl.params.join(", "));
                if decl.body.is_empty() {
                    self.line(&format!("{header} {{}}"));
                } else {
                    self.line(&format!("{header} {{"));
                    self.statements(&decl.body);
                    self.line("}");
                }
            }
        }
    }

    fn statements(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        for stmt in statements {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    /// 输出 `header` 开头、以 `}` 结尾的代码块
    fn braced(&mut self, header: &str, body: &Stmt) {
        self.line(header);
        self.body(body);
        self.line("}");
    }

    fn body(&mut self, body: &Stmt) {
        match &**body {
            StmtKind::Block(block) => self.statements(&block.statements),
            _ => self.statements(std::slice::from_ref(body)),
        }
    }

    fn if_chain(&mut self, stmt: &IfStmt, keyword: &str) {
        let header = format!("{} {} {{", keyword, self.expr(&stmt.condition));
        self.line(&header);
        self.body(&stmt.then_body);
        match &stmt.else_body {
            None => self.line("}"),
            Some(else_body) => match &**else_body {
                StmtKind::If(inner) => self.if_chain(inner, "} else if"),
                _ => self.braced("} else {", else_body),
            },
        }
    }

    fn arguments(&self, arguments: &[Expr]) -> String {
        arguments
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, expr: &Expr) -> String {
        self.expr_at(expr, 0)
    }

    /// 格式化表达式；若其优先级低于 `min_precedence` 则加括号
    fn expr_at(&self, expr: &Expr, min_precedence: i32) -> String {
        let text = self.expr_inner(expr);
        if precedence_of(expr) < min_precedence {
            format!("({text})")
        } else {
            text
        }
    }

    fn expr_inner(&self, expr: &Expr) -> String {
        match &**expr {
            ExprKind::LiteralNumber(n) => format_number(n.value),
            ExprKind::LiteralString(s) => quote(&s.value),
            ExprKind::LiteralTrue(_) => "true".to_string(),
            ExprKind::LiteralFalse(_) => "false".to_string(),
            ExprKind::LiteralNil(_) => "nil".to_string(),
            ExprKind::Binary(binary) => {
                let precedence = get_precedence(binary.op.token());
                format!(
                    "{} {} {}",
                    self.expr_at(&binary.left, precedence),
                    binary.op.token(),
                    // 左结合：同级的右操作数必须加括号
                    self.expr_at(&binary.right, precedence + 1)
                )
            }
            ExprKind::Unary(unary) => {
                format!("{}{}", unary.op.token(), self.expr_at(&unary.operand, UNARY_PRECEDENCE))
            }
            ExprKind::Receive(receive) => {
                format!(
                    "{}{}",
                    TokenKind::LeftArrow,
                    self.expr_at(&receive.channel, UNARY_PRECEDENCE)
                )
            }
            ExprKind::Grouping(group) => format!("({})", self.expr(&group.expression)),
            ExprKind::VarRef(var) => var.name.clone(),
            ExprKind::FunctionCall(call) => format!(
                "{}({})",
                self.expr_at(&call.function_expr, POSTFIX_PRECEDENCE),
                self.arguments(&call.arguments)
            ),
            ExprKind::MemberAccess(access) => format!(
                "{}.{}",
                self.expr_at(&access.object, POSTFIX_PRECEDENCE),
                access.member
            ),
            ExprKind::ObjectLiteral(object) => {
                let properties = object
                    .properties
                    .iter()
                    .map(|(key, value)| format!("{}: {}", object_key(key), self.expr(value)))
                    .collect::<Vec<_>>();
                format!("{{{}}}", properties.join(", "))
            }
            ExprKind::Lambda(lambda) => {
                let header = format!("fun ({})", lambda.params.join(", "));
                if lambda.body.is_empty() {
                    return format!("{header} {{}}");
                }
                let mut inner = Formatter::new(self.indent + 1);
                for stmt in &lambda.body {
                    inner.stmt(stmt);
                }
                format!("{header} {{\n{}{}}}", inner.output, "  ".repeat(self.indent))
            }
        }
    }
}

fn precedence_of(expr: &Expr) -> i32 {
    match &**expr {
        ExprKind::Binary(binary) => get_precedence(binary.op.token()),
        ExprKind::Unary(_) | ExprKind::Receive(_) => UNARY_PRECEDENCE,
        _ => POSTFIX_PRECEDENCE,
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn object_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && TokenKind::keyword(key).is_none();
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse;

    fn parse_code(code: &str) -> Vec<Stmt> {
        parse(tokenize(code).unwrap()).unwrap()
    }

    fn assert_round_trip(code: &str) {
        let first = parse_code(code);
        let formatted = format_program(&first);
        let second = parse_code(&formatted);
        assert_eq!(first, second, "formatted source:\n{formatted}");
    }

    #[test]
    fn test_format_layout() {
        let source = "fun print_numbers(start, end) { let i = start while i < end + 1 { print i yield i = i + 1 } }\nspawn print_numbers(1, 4)";
        let expected = "\
fun print_numbers(start, end) {
  let i = start;
  while i < end + 1 {
    print i;
    yield;
    i = i + 1;
  }
}
spawn print_numbers(1, 4);
";
        assert_eq!(format_program(&parse_code(source)), expected);
    }

    #[test]
    fn test_format_if_chain() {
        let source = "if a { print 1 } else if b { print 2 } else { print 3 }";
        let expected = "\
if a {
  print 1;
} else if b {
  print 2;
} else {
  print 3;
}
";
        assert_eq!(format_program(&parse_code(source)), expected);
    }

    #[test]
    fn test_format_adds_needed_parentheses() {
        let expr = ExprKind::binary(
            ExprKind::binary(ExprKind::number(1.0), BinaryOp::Add, ExprKind::number(2.0)),
            BinaryOp::Multiply,
            ExprKind::number(3.0),
        );
        assert_eq!(format_expression(&expr), "(1 + 2) * 3");

        let expr = ExprKind::binary(
            ExprKind::number(10.0),
            BinaryOp::Subtract,
            ExprKind::binary(ExprKind::number(3.0), BinaryOp::Subtract, ExprKind::number(2.0)),
        );
        assert_eq!(format_expression(&expr), "10 - (3 - 2)");
    }

    #[test]
    fn test_format_strings_and_objects() {
        let stmts = parse_code(r#"let o = {a: "x\"y", "b c": 1.5, if_: nil}"#);
        assert_eq!(
            format_program(&stmts),
            "let o = {a: \"x\\\"y\", \"b c\": 1.5, if_: nil};\n"
        );
    }

    #[test]
    fn test_format_lambda_indents_body() {
        let stmts = parse_code("fun outer() { let f = fun (x) { print x } f(1) }");
        let expected = "\
fun outer() {
  let f = fun (x) {
    print x;
  };
  f(1);
}
";
        assert_eq!(format_program(&stmts), expected);
    }

    #[test]
    fn test_round_trip_programs() {
        assert_round_trip(
            r#"
            fun sender(ch) { ch <- 42 }
            let channel = Channel(1)
            spawn sender(channel)
            print <-channel
            "#,
        );
        assert_round_trip("let x = -(1 + 2) * 3 - -4 / (5 - 6) print !(x == 1) != false");
        assert_round_trip("let o = {a: {b: 1}} o.a.b = 2 print o.a.b");
        assert_round_trip("fun f() {} let g = fun () {} print f() return");
        assert_round_trip("while true { if x { return } else { yield } }");
    }
}

//! 语句树 → 指令序列编译器
//!
//! 编译是纯函数：不会失败，不同调用之间不共享状态。

pub mod expr;
pub mod stmt;

use std::rc::Rc;

use tracing::{debug, trace};

use crate::compiler::parser::{Expr, Stmt};
use crate::runtime::bytecode::Instruction;
use crate::runtime::value::{Function, Value};

/// 指令序列编译器
pub struct Compiler {
    pub(crate) instructions: Vec<Instruction>,
    /// 0 表示程序顶层；函数体与代码块中大于 0
    pub(crate) scope_depth: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_depth(0)
    }

    pub(crate) fn with_depth(scope_depth: usize) -> Self {
        Self {
            instructions: Vec::new(),
            scope_depth,
        }
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub(crate) fn emit_all(&mut self, instructions: Vec<Instruction>) {
        self.instructions.extend(instructions);
    }

    /// 在同一深度的子编译器中编译语句，返回其指令（用于计算跳转偏移）
    pub(crate) fn stmt_code(&self, stmt: &Stmt) -> Vec<Instruction> {
        let mut child = Compiler::with_depth(self.scope_depth);
        stmt::compile_stmt(&mut child, stmt);
        child.instructions
    }

    pub(crate) fn expr_code(&self, expr: &Expr) -> Vec<Instruction> {
        let mut child = Compiler::with_depth(self.scope_depth);
        expr::compile_expr(&mut child, expr);
        child.instructions
    }

    pub fn finish(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// 编译整个程序
pub fn compile(statements: &[Stmt]) -> Vec<Instruction> {
    let mut compiler = Compiler::new();
    for stmt in statements {
        stmt::compile_stmt(&mut compiler, stmt);
    }
    let instructions = compiler.finish();
    debug!(
        target: "strand::compiler",
        statements = statements.len(),
        instructions = instructions.len(),
        "Compiled program"
    );
    instructions
}

/// 编译单个表达式
pub fn compile_expression(expr: &Expr) -> Vec<Instruction> {
    let mut compiler = Compiler::new();
    expr::compile_expr(&mut compiler, expr);
    compiler.finish()
}

/// 编译函数体
///
/// 若函数体中任何位置都没有 `Return` 指令，末尾追加 `Push(Nil), Return`。
/// 只做浅层扫描，不分析可达性。
pub(crate) fn compile_function(
    name: Option<&str>,
    params: &[String],
    body: &[Stmt],
) -> Function {
    let mut compiler = Compiler::with_depth(1);
    for stmt in body {
        stmt::compile_stmt(&mut compiler, stmt);
    }
    let mut instructions = compiler.finish();
    if !instructions.iter().any(|i| matches!(i, Instruction::Return)) {
        instructions.push(Instruction::Push(Value::Nil));
        instructions.push(Instruction::Return);
    }

    trace!(
        target: "strand::compiler",
        name = name.unwrap_or("<lambda>"),
        arity = params.len(),
        instructions = instructions.len(),
        "Compiled function"
    );
    Function {
        name: name.map(str::to_string),
        parameters: params.to_vec(),
        body: Rc::from(instructions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse;
    use Instruction::*;

    fn compile_code(code: &str) -> Vec<Instruction> {
        compile(&parse(tokenize(code).unwrap()).unwrap())
    }

    fn function_body(instruction: &Instruction) -> Vec<Instruction> {
        match instruction {
            Push(Value::Function(f)) => f.body.to_vec(),
            other => panic!("expected function push, got {other:?}"),
        }
    }

    #[test]
    fn test_while_layout() {
        let code = compile_code("while x < 3 { x = x + 1 }");
        // 条件 n = 3；循环体是一个 block：BlockStart + (4) + BlockEnd = 6
        let (n, m) = (3, 6);
        assert_eq!(code.len(), n + m + 4);
        assert_eq!(code[0], BlockStart);
        assert_eq!(code[1 + n], JumpIfFalse(m as isize + 1));
        assert_eq!(code[code.len() - 2], Jump(-((n + m + 2) as isize)));
        assert_eq!(code[code.len() - 1], BlockEnd);
    }

    #[test]
    fn test_if_layout() {
        let code = compile_code("if c { print 1 } else { print 2 }");
        assert_eq!(
            code,
            vec![
                BlockStart,
                GetLocal("c".into()),
                JumpIfFalse(5),
                BlockStart,
                Push(Value::Number(1.0)),
                Print,
                BlockEnd,
                Jump(4),
                BlockStart,
                Push(Value::Number(2.0)),
                Print,
                BlockEnd,
                BlockEnd,
            ]
        );

        let code = compile_code("if c { print 1 }");
        assert_eq!(code[2], JumpIfFalse(5));
        assert_eq!(code[7], Jump(0));
    }

    #[test]
    fn test_implicit_return() {
        let code = compile_code("fun f(a) { print a }");
        assert_eq!(code[1], DeclareGlobal("f".into()));
        assert_eq!(
            function_body(&code[0]),
            vec![GetLocal("a".into()), Print, Push(Value::Nil), Return]
        );

        // 已有 Return 时不追加
        let code = compile_code("fun g() { return 1 }");
        assert_eq!(
            function_body(&code[0]),
            vec![Push(Value::Number(1.0)), Return]
        );

        // 浅层扫描：分支中的 Return 也算
        let code = compile_code("fun h(x) { if x { return 1 } }");
        let body = function_body(&code[0]);
        assert_ne!(body.last(), Some(&Push(Value::Nil)));
        assert_eq!(body.iter().filter(|i| **i == Return).count(), 1);
    }

    #[test]
    fn test_nested_function_is_local() {
        let code = compile_code("{ fun inner() {} }");
        assert_eq!(code[2], DeclareLocal("inner".into()));

        let code = compile_code("fun outer() { fun inner() {} }");
        let body = function_body(&code[0]);
        assert_eq!(body[1], DeclareLocal("inner".into()));
    }

    #[test]
    fn test_spawn_and_channels() {
        let code = compile_code("spawn worker(ch, 2) ch <- 1 print <-ch");
        assert_eq!(
            code,
            vec![
                GetLocal("ch".into()),
                Push(Value::Number(2.0)),
                GetLocal("worker".into()),
                Spawn(2),
                Push(Value::Number(1.0)),
                GetLocal("ch".into()),
                ChannelSend,
                GetLocal("ch".into()),
                ChannelReceive,
                Print,
            ]
        );
    }

    #[test]
    fn test_object_literal_and_property_assign() {
        let code = compile_code(r#"let o = {a: 1, b: "x"} o.a = 2"#);
        assert_eq!(
            code,
            vec![
                Push(Value::object(crate::runtime::object::Object::new())),
                Push(Value::Number(1.0)),
                DefineProperty("a".into()),
                Push(Value::string("x")),
                DefineProperty("b".into()),
                DeclareLocal("o".into()),
                GetLocal("o".into()),
                Push(Value::Number(2.0)),
                DefineProperty("a".into()),
                Pop,
            ]
        );
    }

    #[test]
    fn test_expressions() {
        let expr = parse(tokenize("print -(1 + 2) * f(3).x").unwrap()).unwrap();
        let code = compile(&expr);
        assert_eq!(
            code,
            vec![
                Push(Value::Number(1.0)),
                Push(Value::Number(2.0)),
                Add,
                Negate,
                Push(Value::Number(3.0)),
                GetLocal("f".into()),
                Call(1),
                AccessProperty("x".into()),
                Multiply,
                Print,
            ]
        );
    }

    #[test]
    fn test_bare_return_and_statements() {
        let code = compile_code("return");
        assert_eq!(code, vec![Push(Value::Nil), Return]);

        let code = compile_code("f() yield x = 1");
        assert_eq!(
            code,
            vec![
                GetLocal("f".into()),
                Call(0),
                Pop,
                Yield,
                Push(Value::Number(1.0)),
                SetLocal("x".into()),
            ]
        );
    }
}

//! 语句编译

use crate::compiler::parser::stmt::{AssignTarget, IfStmt, WhileStmt};
use crate::compiler::parser::{Stmt, StmtKind};
use crate::runtime::bytecode::Instruction;
use crate::runtime::value::Value;

use super::expr::compile_expr;
use super::{compile_function, Compiler};

/// 编译语句
pub fn compile_stmt(compiler: &mut Compiler, stmt: &Stmt) {
    match stmt.as_ref() {
        StmtKind::Expr(expr) => {
            compile_expr(compiler, &expr.expression);
            // 表达式语句的结果丢弃
            compiler.emit(Instruction::Pop);
        }

        StmtKind::Block(block) => {
            compiler.emit(Instruction::BlockStart);
            compiler.scope_depth += 1;
            for stmt in &block.statements {
                compile_stmt(compiler, stmt);
            }
            compiler.scope_depth -= 1;
            compiler.emit(Instruction::BlockEnd);
        }

        StmtKind::VarDecl(decl) => {
            compile_expr(compiler, &decl.initializer);
            compiler.emit(Instruction::DeclareLocal(decl.name.clone()));
        }

        StmtKind::Assign(assign) => match &assign.target {
            AssignTarget::Variable(name) => {
                compile_expr(compiler, &assign.value);
                compiler.emit(Instruction::SetLocal(name.clone()));
            }
            AssignTarget::Property { object, member } => {
                compile_expr(compiler, object);
                compile_expr(compiler, &assign.value);
                compiler.emit(Instruction::DefineProperty(member.clone()));
                compiler.emit(Instruction::Pop);
            }
        },

        StmtKind::If(if_stmt) => compile_if(compiler, if_stmt),

        StmtKind::While(while_stmt) => compile_while(compiler, while_stmt),

        StmtKind::Return(ret) => {
            match &ret.value {
                Some(value) => compile_expr(compiler, value),
                None => compiler.emit(Instruction::Push(Value::Nil)),
            }
            compiler.emit(Instruction::Return);
        }

        StmtKind::Print(print) => {
            compile_expr(compiler, &print.expression);
            compiler.emit(Instruction::Print);
        }

        StmtKind::Spawn(spawn) => {
            for argument in &spawn.arguments {
                compile_expr(compiler, argument);
            }
            compile_expr(compiler, &spawn.callee);
            compiler.emit(Instruction::Spawn(spawn.arguments.len()));
        }

        StmtKind::Yield(_) => compiler.emit(Instruction::Yield),

        StmtKind::Send(send) => {
            compile_expr(compiler, &send.value);
            compile_expr(compiler, &send.channel);
            compiler.emit(Instruction::ChannelSend);
        }

        StmtKind::FunctionDecl(decl) => {
            let function = compile_function(Some(decl.name.as_str()), &decl.params, &decl.body);
            compiler.emit(Instruction::Push(Value::function(function)));
            if compiler.scope_depth == 0 {
                compiler.emit(Instruction::DeclareGlobal(decl.name.clone()));
            } else {
                compiler.emit(Instruction::DeclareLocal(decl.name.clone()));
            }
        }
    }
}

/// `BlockStart` cond `JumpIfFalse(then+1)` then `Jump(else)` else `BlockEnd`
fn compile_if(compiler: &mut Compiler, if_stmt: &IfStmt) {
    compiler.emit(Instruction::BlockStart);
    compiler.scope_depth += 1;

    let condition = compiler.expr_code(&if_stmt.condition);
    let then_branch = compiler.stmt_code(&if_stmt.then_body);
    let else_branch = if_stmt
        .else_body
        .as_ref()
        .map(|body| compiler.stmt_code(body))
        .unwrap_or_default();

    compiler.emit_all(condition);
    compiler.emit(Instruction::JumpIfFalse(then_branch.len() as isize + 1));
    compiler.emit_all(then_branch);
    compiler.emit(Instruction::Jump(else_branch.len() as isize));
    compiler.emit_all(else_branch);

    compiler.scope_depth -= 1;
    compiler.emit(Instruction::BlockEnd);
}

/// `BlockStart` cond `JumpIfFalse(body+1)` body `Jump(-(cond+body+2))` `BlockEnd`
fn compile_while(compiler: &mut Compiler, while_stmt: &WhileStmt) {
    compiler.emit(Instruction::BlockStart);
    compiler.scope_depth += 1;

    let condition = compiler.expr_code(&while_stmt.condition);
    let body = compiler.stmt_code(&while_stmt.body);
    let back = -((condition.len() + body.len() + 2) as isize);

    compiler.emit_all(condition);
    compiler.emit(Instruction::JumpIfFalse(body.len() as isize + 1));
    compiler.emit_all(body);
    compiler.emit(Instruction::Jump(back));

    compiler.scope_depth -= 1;
    compiler.emit(Instruction::BlockEnd);
}

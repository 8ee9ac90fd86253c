//! 表达式编译

use crate::compiler::parser::expr::{BinaryOp, UnaryOp};
use crate::compiler::parser::{Expr, ExprKind};
use crate::runtime::bytecode::Instruction;
use crate::runtime::object::Object;
use crate::runtime::value::Value;

use super::{compile_function, Compiler};

/// 编译表达式；每个表达式在栈上恰好留下一个值
pub fn compile_expr(compiler: &mut Compiler, expr: &Expr) {
    match expr.as_ref() {
        ExprKind::LiteralNumber(n) => compiler.emit(Instruction::Push(Value::Number(n.value))),
        ExprKind::LiteralString(s) => compiler.emit(Instruction::Push(Value::string(&s.value))),
        ExprKind::LiteralTrue(_) => compiler.emit(Instruction::Push(Value::Boolean(true))),
        ExprKind::LiteralFalse(_) => compiler.emit(Instruction::Push(Value::Boolean(false))),
        ExprKind::LiteralNil(_) => compiler.emit(Instruction::Push(Value::Nil)),

        ExprKind::Binary(binary) => {
            // VM 先弹出右操作数，再弹出左操作数
            compile_expr(compiler, &binary.left);
            compile_expr(compiler, &binary.right);
            compiler.emit(binary_instruction(binary.op));
        }

        ExprKind::Unary(unary) => {
            compile_expr(compiler, &unary.operand);
            compiler.emit(match unary.op {
                UnaryOp::Negate => Instruction::Negate,
                UnaryOp::Not => Instruction::Not,
            });
        }

        ExprKind::Grouping(group) => compile_expr(compiler, &group.expression),

        ExprKind::VarRef(var) => compiler.emit(Instruction::GetLocal(var.name.clone())),

        ExprKind::FunctionCall(call) => {
            for argument in &call.arguments {
                compile_expr(compiler, argument);
            }
            compile_expr(compiler, &call.function_expr);
            compiler.emit(Instruction::Call(call.arguments.len()));
        }

        ExprKind::MemberAccess(access) => {
            compile_expr(compiler, &access.object);
            compiler.emit(Instruction::AccessProperty(access.member.clone()));
        }

        ExprKind::ObjectLiteral(object) => {
            // 空对象作为模板，VM 在 Push 时实例化一个新对象
            compiler.emit(Instruction::Push(Value::object(Object::new())));
            for (name, value) in &object.properties {
                compile_expr(compiler, value);
                compiler.emit(Instruction::DefineProperty(name.clone()));
            }
        }

        ExprKind::Lambda(lambda) => {
            let function = compile_function(None, &lambda.params, &lambda.body);
            compiler.emit(Instruction::Push(Value::function(function)));
        }

        ExprKind::Receive(receive) => {
            compile_expr(compiler, &receive.channel);
            compiler.emit(Instruction::ChannelReceive);
        }
    }
}

fn binary_instruction(op: BinaryOp) -> Instruction {
    match op {
        BinaryOp::Add => Instruction::Add,
        BinaryOp::Subtract => Instruction::Subtract,
        BinaryOp::Multiply => Instruction::Multiply,
        BinaryOp::Divide => Instruction::Divide,
        BinaryOp::Equal => Instruction::Equal,
        BinaryOp::NotEqual => Instruction::NotEqual,
        BinaryOp::Less => Instruction::LessThan,
        BinaryOp::LessEqual => Instruction::LessThanEqual,
        BinaryOp::Greater => Instruction::GreaterThan,
        BinaryOp::GreaterEqual => Instruction::GreaterThanEqual,
    }
}

//! 反汇编器

use super::instruction::Instruction;
use crate::runtime::value::{Function, Value};
use std::rc::Rc;

/// 反汇编指令序列
///
/// 每条指令带序号，跳转指令附带解析后的目标位置；
/// 嵌套函数体依次追加在后面，命名为 `name#func_N`（N 为其 PUSH 所在位置）。
pub fn disassemble(instructions: &[Instruction], name: &str) -> String {
    let mut out = String::new();
    disassemble_into(&mut out, instructions, name);
    out
}

fn disassemble_into(out: &mut String, instructions: &[Instruction], name: &str) {
    out.push_str(&format!("== {name} ==\n"));

    let mut nested: Vec<(usize, Rc<Function>)> = Vec::new();
    for (offset, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::Jump(delta) | Instruction::JumpIfFalse(delta) => {
                let target = offset as isize + 1 + delta;
                out.push_str(&format!("{offset:04}  {instruction} -> {target:04}\n"));
            }
            Instruction::Push(Value::Function(function)) => {
                out.push_str(&format!("{offset:04}  {instruction}\n"));
                nested.push((offset, Rc::clone(function)));
            }
            _ => out.push_str(&format!("{offset:04}  {instruction}\n")),
        }
    }

    for (offset, function) in nested {
        let label = match &function.name {
            Some(fn_name) => format!("{name}#func_{offset} ({fn_name})"),
            None => format!("{name}#func_{offset}"),
        };
        disassemble_into(out, &function.body, &label);
    }
}

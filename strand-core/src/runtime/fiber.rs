//! Fiber：可恢复的执行记录
//!
//! 一个 fiber 拥有调用帧栈和所有帧共享的操作数栈。

use std::collections::HashMap;
use std::rc::Rc;

use strand_config::{LimitConfig, VmConfig};

use super::bytecode::Instruction;
use super::error::RuntimeError;
use super::value::Value;

pub type FiberId = usize;

/// 调用帧
#[derive(Debug)]
pub struct CallFrame {
    pub ip: usize,
    pub instructions: Rc<[Instruction]>,
    /// 词法作用域栈，末尾为最内层
    pub scopes: Vec<HashMap<String, Value>>,
}

impl CallFrame {
    pub fn new(instructions: Rc<[Instruction]>, scope: HashMap<String, Value>) -> Self {
        Self {
            ip: 0,
            instructions,
            scopes: vec![scope],
        }
    }

    /// 由内向外查找变量
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// 由内向外查找并覆盖；未找到时返回 false
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// 在最内层作用域绑定
    pub fn declare(&mut self, name: String, value: Value) {
        if self.scopes.is_empty() {
            self.scopes.push(HashMap::new());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }
}

#[derive(Debug)]
pub struct Fiber {
    pub id: FiberId,
    pub frames: Vec<CallFrame>,
    pub stack: Vec<Value>,
    max_stack: usize,
}

impl Fiber {
    pub fn new(id: FiberId, frame: CallFrame, vm_config: &VmConfig, limits: &LimitConfig) -> Self {
        let mut frames = Vec::with_capacity(vm_config.initial_frames_capacity);
        frames.push(frame);
        Self {
            id,
            frames,
            stack: Vec::with_capacity(vm_config.initial_stack_size),
            max_stack: limits.max_operand_stack,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.max_stack {
            return Err(RuntimeError::StackOverflow(format!(
                "operand stack exceeded {} values",
                self.max_stack
            )));
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// 弹出 n 个值，按压栈顺序返回
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.stack.len() < n {
            return Err(RuntimeError::StackUnderflow);
        }
        let at = self.stack.len() - n;
        Ok(self.stack.split_off(at))
    }

    pub fn frame(&self) -> Result<&CallFrame, RuntimeError> {
        self.frames.last().ok_or(RuntimeError::CallStackEmpty)
    }

    pub fn frame_mut(&mut self) -> Result<&mut CallFrame, RuntimeError> {
        self.frames.last_mut().ok_or(RuntimeError::CallStackEmpty)
    }
}

//! fiber 执行循环

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

#[cfg(feature = "trace_execution")]
use tracing::trace;

use crate::runtime::bytecode::Instruction;
use crate::runtime::channel::{Channel, ReceiveOutcome, SendOutcome};
use crate::runtime::error::RuntimeError;
use crate::runtime::fiber::{CallFrame, Fiber};
use crate::runtime::value::{Function, Value};

use super::VM;

/// fiber 交还控制权时的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FiberStatus {
    /// 调用栈已空
    Terminated,
    /// `Yield`：回到队尾
    Yielded,
    /// 通道操作没有配对方：挂起
    Blocked,
    /// `Exit`：整个 VM 停止
    Halted,
}

/// 执行 fiber 直到它结束、让出、阻塞或停机
pub(crate) fn run_fiber(vm: &mut VM, fiber: &mut Fiber) -> Result<FiberStatus, RuntimeError> {
    loop {
        let Some(frame) = fiber.frames.last_mut() else {
            return Ok(FiberStatus::Terminated);
        };
        let code = Rc::clone(&frame.instructions);
        let ip = frame.ip;
        let Some(instruction) = code.get(ip) else {
            // 越过帧末尾：等价于隐式 `return nil`
            fiber.push(Value::Nil)?;
            fiber.frames.pop();
            continue;
        };
        frame.ip += 1;

        #[cfg(feature = "trace_execution")]
        trace!(
            target: "strand::vm",
            fiber = fiber.id,
            ip,
            instruction = %instruction,
            stack = fiber.stack.len(),
            "execute"
        );

        match instruction {
            // ===== 栈操作 =====
            Instruction::Push(value) => {
                let value = match value {
                    // 对象字面量模板：每次求值得到新对象
                    Value::Object(template) => Value::object(template.borrow().clone()),
                    other => other.clone(),
                };
                fiber.push(value)?;
            }
            Instruction::Pop => {
                fiber.pop()?;
            }

            // ===== 算术 =====
            Instruction::Add => {
                let right = fiber.pop()?;
                let left = fiber.pop()?;
                let result = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                    (Value::String(a), Value::String(b)) => Value::string(format!("{a}{b}")),
                    _ => {
                        return Err(RuntimeError::TypeMismatch(format!(
                            "operands of '+' must be two numbers or two strings, got {} and {}",
                            left.type_name(),
                            right.type_name()
                        )))
                    }
                };
                fiber.push(result)?;
            }
            Instruction::Subtract => {
                let (a, b) = pop_numbers(fiber, "-")?;
                fiber.push(Value::Number(a - b))?;
            }
            Instruction::Multiply => {
                let (a, b) = pop_numbers(fiber, "*")?;
                fiber.push(Value::Number(a * b))?;
            }
            Instruction::Divide => {
                let (a, b) = pop_numbers(fiber, "/")?;
                fiber.push(Value::Number(a / b))?;
            }
            Instruction::Negate => match fiber.pop()? {
                Value::Number(n) => fiber.push(Value::Number(-n))?,
                other => return Err(RuntimeError::type_mismatch("'-'", other.type_name())),
            },
            Instruction::Not => match fiber.pop()? {
                Value::Boolean(b) => fiber.push(Value::Boolean(!b))?,
                other => return Err(RuntimeError::type_mismatch("'!'", other.type_name())),
            },

            // ===== 比较 =====
            Instruction::Equal => {
                let right = fiber.pop()?;
                let left = fiber.pop()?;
                fiber.push(Value::Boolean(left.equals(&right)))?;
            }
            Instruction::NotEqual => {
                let right = fiber.pop()?;
                let left = fiber.pop()?;
                fiber.push(Value::Boolean(!left.equals(&right)))?;
            }
            Instruction::LessThan => compare(fiber, "<", Ordering::is_lt)?,
            Instruction::LessThanEqual => compare(fiber, "<=", Ordering::is_le)?,
            Instruction::GreaterThan => compare(fiber, ">", Ordering::is_gt)?,
            Instruction::GreaterThanEqual => compare(fiber, ">=", Ordering::is_ge)?,

            // ===== 变量 =====
            Instruction::GetLocal(name) => {
                let value = fiber
                    .frame()?
                    .lookup(name)
                    .or_else(|| vm.globals.get(name))
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?;
                fiber.push(value)?;
            }
            Instruction::SetLocal(name) => {
                let value = fiber.pop()?;
                let frame = fiber.frame_mut()?;
                if !frame.assign(name, value.clone()) {
                    match vm.globals.get_mut(name) {
                        Some(slot) => *slot = value,
                        None => return Err(RuntimeError::UndefinedVariable(name.clone())),
                    }
                }
            }
            Instruction::DeclareLocal(name) => {
                let value = fiber.pop()?;
                fiber.frame_mut()?.declare(name.clone(), value);
            }
            Instruction::GetGlobal(name) => {
                let value = vm
                    .globals
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?;
                fiber.push(value)?;
            }
            Instruction::SetGlobal(name) => {
                let value = fiber.pop()?;
                match vm.globals.get_mut(name) {
                    Some(slot) => *slot = value,
                    None => return Err(RuntimeError::UndefinedVariable(name.clone())),
                }
            }
            Instruction::DeclareGlobal(name) => {
                let value = fiber.pop()?;
                vm.globals.insert(name.clone(), value);
            }

            // ===== 作用域 =====
            Instruction::BlockStart => fiber.frame_mut()?.scopes.push(HashMap::new()),
            Instruction::BlockEnd => {
                fiber.frame_mut()?.scopes.pop();
            }

            // ===== 控制流 =====
            Instruction::Jump(offset) => jump(fiber, *offset)?,
            Instruction::JumpIfFalse(offset) => match fiber.pop()? {
                Value::Boolean(false) => jump(fiber, *offset)?,
                Value::Boolean(true) => {}
                other => {
                    return Err(RuntimeError::TypeMismatch(format!(
                        "condition must be a boolean, got {}",
                        other.type_name()
                    )))
                }
            },
            Instruction::Call(arity) => call(vm, fiber, *arity)?,
            Instruction::Return => {
                // 返回值已由被调函数压栈
                fiber.frames.pop();
            }

            // ===== 并发 =====
            Instruction::Spawn(arity) => spawn(vm, fiber, *arity)?,
            Instruction::Yield => return Ok(FiberStatus::Yielded),
            Instruction::ChannelSend => {
                let channel = match fiber.pop()? {
                    Value::Channel(channel) => channel,
                    other => return Err(RuntimeError::type_mismatch("'<-' send", other.type_name())),
                };
                let value = fiber.pop()?;
                if !send(vm, fiber, &channel, value) {
                    return Ok(FiberStatus::Blocked);
                }
            }
            Instruction::ChannelReceive => {
                let channel = match fiber.pop()? {
                    Value::Channel(channel) => channel,
                    other => {
                        return Err(RuntimeError::type_mismatch("'<-' receive", other.type_name()))
                    }
                };
                let outcome = channel.borrow_mut().receive(fiber.id);
                match outcome {
                    ReceiveOutcome::Ready { value, unblocked } => {
                        fiber.push(value)?;
                        if let Some(sender) = unblocked {
                            vm.scheduler.wake(sender, None);
                        }
                    }
                    // 被唤醒时值已由发送方压入本 fiber 的栈
                    ReceiveOutcome::Blocked => return Ok(FiberStatus::Blocked),
                }
            }

            // ===== 对象 =====
            Instruction::AccessProperty(name) => match fiber.pop()? {
                Value::Object(object) => {
                    let value = object
                        .borrow()
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UndefinedProperty(name.clone()))?;
                    fiber.push(value)?;
                }
                other => {
                    return Err(RuntimeError::type_mismatch(
                        &format!("'.{name}'"),
                        other.type_name(),
                    ))
                }
            },
            Instruction::DefineProperty(name) => {
                let value = fiber.pop()?;
                match fiber.pop()? {
                    Value::Object(object) => {
                        object.borrow_mut().set(name.clone(), value);
                        fiber.push(Value::Object(object))?;
                    }
                    other => {
                        return Err(RuntimeError::type_mismatch(
                            &format!("'.{name} ='"),
                            other.type_name(),
                        ))
                    }
                }
            }

            Instruction::Print => {
                let value = fiber.stack.pop().ok_or(RuntimeError::EmptyPrint)?;
                writeln!(vm.output, "{value}")?;
            }
            Instruction::Exit => return Ok(FiberStatus::Halted),
        }
    }
}

fn pop_numbers(fiber: &mut Fiber, op: &str) -> Result<(f64, f64), RuntimeError> {
    let right = fiber.pop()?;
    let left = fiber.pop()?;
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::TypeMismatch(format!(
            "operands of '{op}' must be numbers, got {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// 数字与数字、字符串与字符串可比较；NaN 参与的比较为 false
fn compare(fiber: &mut Fiber, op: &str, test: fn(Ordering) -> bool) -> Result<(), RuntimeError> {
    let right = fiber.pop()?;
    let left = fiber.pop()?;
    let ordering = match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(RuntimeError::TypeMismatch(format!(
                "cannot compare {} {op} {}",
                left.type_name(),
                right.type_name()
            )))
        }
    };
    fiber.push(Value::Boolean(ordering.is_some_and(test)))
}

/// ip 已越过跳转指令，偏移在此基础上生效
fn jump(fiber: &mut Fiber, offset: isize) -> Result<(), RuntimeError> {
    let frame = fiber.frame_mut()?;
    let target = frame
        .ip
        .checked_add_signed(offset)
        .filter(|target| *target <= frame.instructions.len())
        .ok_or(RuntimeError::InvalidJump(offset))?;
    frame.ip = target;
    Ok(())
}

/// 按参数顺序把实参绑定到新作用域
fn bind_arguments(
    fiber: &mut Fiber,
    function: &Function,
    arity: usize,
) -> Result<HashMap<String, Value>, RuntimeError> {
    if arity != function.arity() {
        return Err(RuntimeError::ArityMismatch {
            name: function.name.clone().unwrap_or_else(|| "<lambda>".to_string()),
            expected: function.arity(),
            found: arity,
        });
    }
    let arguments = fiber.pop_n(arity)?;
    Ok(function
        .parameters
        .iter()
        .cloned()
        .zip(arguments)
        .collect())
}

fn call(vm: &mut VM, fiber: &mut Fiber, arity: usize) -> Result<(), RuntimeError> {
    match fiber.pop()? {
        Value::Function(function) => {
            if fiber.frames.len() >= vm.limits.max_call_depth {
                return Err(RuntimeError::StackOverflow(format!(
                    "call depth exceeded {}",
                    vm.limits.max_call_depth
                )));
            }
            let scope = bind_arguments(fiber, &function, arity)?;
            fiber
                .frames
                .push(CallFrame::new(Rc::clone(&function.body), scope));
            Ok(())
        }
        Value::NativeFunction(native) => {
            if arity != native.arity {
                return Err(RuntimeError::ArityMismatch {
                    name: native.name.clone(),
                    expected: native.arity,
                    found: arity,
                });
            }
            let arguments = fiber.pop_n(arity)?;
            let result = (native.func)(&arguments).map_err(|message| RuntimeError::Native {
                name: native.name.clone(),
                message,
            })?;
            fiber.push(result)
        }
        other => Err(RuntimeError::NotCallable(other.type_name())),
    }
}

/// 新 fiber 排到队尾，当前 fiber 继续执行
fn spawn(vm: &mut VM, fiber: &mut Fiber, arity: usize) -> Result<(), RuntimeError> {
    let function = match fiber.pop()? {
        Value::Function(function) => function,
        other => return Err(RuntimeError::NotCallable(other.type_name())),
    };
    let scope = bind_arguments(fiber, &function, arity)?;
    let id = vm.scheduler.next_fiber_id();
    let frame = CallFrame::new(Rc::clone(&function.body), scope);
    let child = Fiber::new(id, frame, &vm.config, &vm.limits);
    vm.scheduler.spawn(child);
    Ok(())
}

/// 发送；返回 false 表示发送方需要阻塞
fn send(
    vm: &mut VM,
    fiber: &Fiber,
    channel: &Rc<RefCell<Channel>>,
    mut value: Value,
) -> bool {
    loop {
        let outcome = channel.borrow_mut().send(fiber.id, value);
        match outcome {
            SendOutcome::Delivered { receiver, value: delivered } => {
                if vm.scheduler.is_blocked(receiver) {
                    vm.scheduler.wake(receiver, Some(delivered));
                    return true;
                }
                // 接收者已不存在（上一次运行残留），换下一个
                value = delivered;
            }
            SendOutcome::Buffered => return true,
            SendOutcome::Blocked => return false,
        }
    }
}

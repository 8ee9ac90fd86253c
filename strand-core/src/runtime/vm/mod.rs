//! 虚拟机实现
//!
//! 单线程协作式调度：FIFO 就绪队列从根 fiber 开始，逐个执行 fiber
//! 直到其结束、让出、阻塞或遇到 `Exit`。

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use strand_config::{LimitConfig, VmConfig};
use thiserror::Error;
use tracing::debug;

use crate::compiler::lexer::{tokenize, LexerError};
use crate::compiler::parser::{parse, ParserError, Stmt};
use crate::runtime::bytecode::Instruction;
use crate::runtime::compiler::compile;
use crate::runtime::error::RuntimeError;
use crate::runtime::fiber::{CallFrame, Fiber};
use crate::runtime::scheduler::Scheduler;
use crate::runtime::stdlib;
use crate::runtime::value::Value;

mod execution;

pub(crate) use execution::FiberStatus;

/// 一次运行的摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// 是否由 `Exit` 终止（其余 fiber 被丢弃）
    pub halted: bool,
    /// 通过 `spawn` 创建的 fiber 数
    pub fibers_spawned: usize,
    /// 就绪队列耗尽时仍然阻塞的 fiber 数（死锁）
    pub blocked_fibers: usize,
}

/// 从源码到执行的统一错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error("{0}")]
    Lexer(#[from] LexerError),
    #[error("{0}")]
    Parser(#[from] ParserError),
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

/// 内存输出缓冲区，可与 VM 共享以捕获 `print` 输出
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<Vec<u8>>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// 取出内容并清空
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 虚拟机
pub struct VM {
    /// 全局变量表（构造时预置原生函数）
    pub(crate) globals: HashMap<String, Value>,
    pub(crate) scheduler: Scheduler,
    pub(crate) output: Box<dyn Write>,
    pub(crate) limits: LimitConfig,
    pub(crate) config: VmConfig,
}

impl VM {
    /// 创建新的虚拟机，输出到标准输出
    pub fn new() -> Self {
        Self::with_config(VmConfig::default(), LimitConfig::default())
    }

    pub fn with_config(config: VmConfig, limits: LimitConfig) -> Self {
        let mut vm = Self {
            globals: HashMap::new(),
            scheduler: Scheduler::new(),
            output: Box::new(io::stdout()),
            limits,
            config,
        };
        vm.init_stdlib();
        vm
    }

    /// 注册原生函数
    fn init_stdlib(&mut self) {
        for (name, arity, func) in stdlib::natives() {
            self.globals
                .insert(name.to_string(), Value::native(name, arity, func));
        }
    }

    /// 将输出重定向到内存缓冲区并返回它
    pub fn capture_output(&mut self) -> OutputBuffer {
        let buffer = OutputBuffer::new();
        self.output = Box::new(buffer.clone());
        buffer
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn limits(&self) -> &LimitConfig {
        &self.limits
    }

    /// 执行指令序列
    ///
    /// 末尾追加 `Exit` 后作为根 fiber 运行。任何运行时错误都会终止整个 VM。
    pub fn run(&mut self, mut instructions: Vec<Instruction>) -> Result<RunSummary, RuntimeError> {
        instructions.push(Instruction::Exit);

        self.scheduler.clear();
        let id = self.scheduler.next_fiber_id();
        let frame = CallFrame::new(Rc::from(instructions), HashMap::new());
        let root = Fiber::new(id, frame, &self.config, &self.limits);
        self.scheduler.enqueue(root);

        let result = self.schedule();
        self.scheduler.clear();
        self.output.flush()?;
        result
    }

    /// 编译并执行语句树
    pub fn run_program(&mut self, statements: &[Stmt]) -> Result<RunSummary, RuntimeError> {
        self.run(compile(statements))
    }

    /// 词法分析 → 语法分析 → 编译 → 执行
    pub fn run_source(&mut self, source: &str) -> Result<RunSummary, InterpretError> {
        let tokens = tokenize(source)?;
        let statements = parse(tokens)?;
        Ok(self.run_program(&statements)?)
    }

    fn schedule(&mut self) -> Result<RunSummary, RuntimeError> {
        let mut halted = false;

        while let Some(mut fiber) = self.scheduler.next() {
            match execution::run_fiber(self, &mut fiber)? {
                FiberStatus::Terminated => {
                    debug!(target: "strand::vm", fiber = fiber.id, "Fiber terminated");
                }
                FiberStatus::Yielded => self.scheduler.enqueue(fiber),
                FiberStatus::Blocked => self.scheduler.park(fiber),
                FiberStatus::Halted => {
                    debug!(
                        target: "strand::vm",
                        fiber = fiber.id,
                        abandoned = self.scheduler.ready_count() + self.scheduler.blocked_count(),
                        "VM halted"
                    );
                    halted = true;
                    break;
                }
            }
        }

        let blocked_fibers = self.scheduler.blocked_count();
        if !halted && blocked_fibers > 0 {
            debug!(
                target: "strand::vm",
                blocked = ?self.scheduler.blocked_ids(),
                "Ready queue drained with blocked fibers"
            );
        }

        Ok(RunSummary {
            halted,
            fibers_spawned: self.scheduler.spawned_count(),
            blocked_fibers,
        })
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

//! 调度器：FIFO 就绪队列与阻塞表
//!
//! 让出的 fiber 排到队尾；被通道操作唤醒的 fiber 插到队首。

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::fiber::{Fiber, FiberId};
use super::value::Value;

#[derive(Debug, Default)]
pub struct Scheduler {
    ready: VecDeque<Fiber>,
    blocked: HashMap<FiberId, Fiber>,
    next_id: FiberId,
    spawned: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配新的 fiber id
    pub fn next_fiber_id(&mut self) -> FiberId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 新建的 fiber 进入队尾
    pub fn spawn(&mut self, fiber: Fiber) {
        self.spawned += 1;
        debug!(target: "strand::vm", fiber = fiber.id, "Spawned fiber");
        self.ready.push_back(fiber);
    }

    /// 让出的 fiber 回到队尾
    pub fn enqueue(&mut self, fiber: Fiber) {
        self.ready.push_back(fiber);
    }

    pub fn next(&mut self) -> Option<Fiber> {
        self.ready.pop_front()
    }

    /// 挂起到阻塞表，等待通道上的配对操作
    pub fn park(&mut self, fiber: Fiber) {
        debug!(target: "strand::vm", fiber = fiber.id, "Fiber blocked");
        self.blocked.insert(fiber.id, fiber);
    }

    /// 唤醒阻塞的 fiber 并插到队首；`value` 为交付给接收者的值
    ///
    /// 返回 false 表示该 id 不在阻塞表中（例如正在运行的 fiber 自身）。
    pub fn wake(&mut self, id: FiberId, value: Option<Value>) -> bool {
        let Some(mut fiber) = self.blocked.remove(&id) else {
            return false;
        };
        if let Some(value) = value {
            fiber.stack.push(value);
        }
        debug!(target: "strand::vm", fiber = id, "Fiber woken");
        self.ready.push_front(fiber);
        true
    }

    pub fn is_blocked(&self, id: FiberId) -> bool {
        self.blocked.contains_key(&id)
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// 本次运行创建的 fiber 数（不含根 fiber）
    pub fn spawned_count(&self) -> usize {
        self.spawned
    }

    pub fn blocked_ids(&self) -> Vec<FiberId> {
        let mut ids: Vec<_> = self.blocked.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 丢弃所有 fiber，为下一次运行复位
    pub fn clear(&mut self) {
        self.ready.clear();
        self.blocked.clear();
        self.spawned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::bytecode::Instruction;
    use crate::runtime::fiber::CallFrame;
    use std::rc::Rc;
    use strand_config::{LimitConfig, VmConfig};

    fn fiber(scheduler: &mut Scheduler) -> Fiber {
        let id = scheduler.next_fiber_id();
        let frame = CallFrame::new(Rc::from(Vec::<Instruction>::new()), HashMap::new());
        Fiber::new(id, frame, &VmConfig::default(), &LimitConfig::default())
    }

    #[test]
    fn test_fifo_order() {
        let mut s = Scheduler::new();
        let a = fiber(&mut s);
        let b = fiber(&mut s);
        s.spawn(a);
        s.enqueue(b);
        assert_eq!(s.next().map(|f| f.id), Some(0));
        assert_eq!(s.next().map(|f| f.id), Some(1));
        assert!(s.next().is_none());
        assert_eq!(s.spawned_count(), 1);
    }

    #[test]
    fn test_wake_goes_to_front() {
        let mut s = Scheduler::new();
        let a = fiber(&mut s);
        let b = fiber(&mut s);
        let c = fiber(&mut s);
        s.enqueue(a);
        s.enqueue(b);
        s.park(c);
        assert_eq!(s.blocked_count(), 1);

        assert!(s.wake(2, Some(Value::Number(9.0))));
        assert!(!s.wake(2, None));
        let first = s.next().unwrap();
        assert_eq!(first.id, 2);
        assert_eq!(first.stack, vec![Value::Number(9.0)]);
        assert_eq!(s.ready_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut s = Scheduler::new();
        let a = fiber(&mut s);
        s.park(a);
        s.clear();
        assert_eq!(s.blocked_count(), 0);
        assert_eq!(s.ready_count(), 0);
    }
}

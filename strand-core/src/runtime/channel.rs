//! 通道
//!
//! 有界 FIFO 缓冲区，加上阻塞发送者与阻塞接收者两条 FIFO 队列。
//! 值不会被复制也不会丢失；容量为 0 时是纯粹的会合点。

use std::collections::VecDeque;

use super::fiber::FiberId;
use super::value::Value;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// 直接交给等待中的接收者；调用方负责唤醒它并传入值
    Delivered { receiver: FiberId, value: Value },
    /// 放入缓冲区
    Buffered,
    /// 缓冲区已满且没有接收者，发送者需阻塞
    Blocked,
}

/// 接收结果
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveOutcome {
    /// 取得值；若某个阻塞的发送者因此可以继续，`unblocked` 为其 id
    Ready {
        value: Value,
        unblocked: Option<FiberId>,
    },
    /// 没有可用的值，接收者需阻塞
    Blocked,
}

#[derive(Debug)]
pub struct Channel {
    capacity: usize,
    buffer: VecDeque<Value>,
    /// 阻塞的发送者及其待发送的值
    senders: VecDeque<(FiberId, Value)>,
    /// 阻塞的接收者
    receivers: VecDeque<FiberId>,
}

impl Channel {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            // 容量只作为上界，缓冲区按需增长
            buffer: VecDeque::new(),
            senders: VecDeque::new(),
            receivers: VecDeque::new(),
        }
    }

    /// 发送：等待中的接收者优先，其次缓冲区，最后挂起
    pub fn send(&mut self, sender: FiberId, value: Value) -> SendOutcome {
        if let Some(receiver) = self.receivers.pop_front() {
            return SendOutcome::Delivered { receiver, value };
        }
        if self.buffer.len() < self.capacity {
            self.buffer.push_back(value);
            return SendOutcome::Buffered;
        }
        self.senders.push_back((sender, value));
        SendOutcome::Blocked
    }

    /// 接收：缓冲区优先（并用最早的挂起值补位），其次挂起的发送者，最后挂起
    pub fn receive(&mut self, receiver: FiberId) -> ReceiveOutcome {
        if let Some(value) = self.buffer.pop_front() {
            let unblocked = self.senders.pop_front().map(|(sender, pending)| {
                self.buffer.push_back(pending);
                sender
            });
            return ReceiveOutcome::Ready { value, unblocked };
        }
        if let Some((sender, value)) = self.senders.pop_front() {
            return ReceiveOutcome::Ready {
                value,
                unblocked: Some(sender),
            };
        }
        self.receivers.push_back(receiver);
        ReceiveOutcome::Blocked
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn pending_senders(&self) -> usize {
        self.senders.len()
    }

    pub fn waiting_receivers(&self) -> usize {
        self.receivers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_unbuffered_send_blocks_until_receive() {
        let mut ch = Channel::new(0);
        assert_eq!(ch.send(1, num(1.0)), SendOutcome::Blocked);
        assert_eq!(ch.send(2, num(2.0)), SendOutcome::Blocked);
        assert_eq!(ch.pending_senders(), 2);

        assert_eq!(
            ch.receive(0),
            ReceiveOutcome::Ready {
                value: num(1.0),
                unblocked: Some(1)
            }
        );
        assert_eq!(
            ch.receive(0),
            ReceiveOutcome::Ready {
                value: num(2.0),
                unblocked: Some(2)
            }
        );
        assert_eq!(ch.receive(0), ReceiveOutcome::Blocked);
        assert_eq!(ch.waiting_receivers(), 1);
    }

    #[test]
    fn test_waiting_receiver_gets_direct_handoff() {
        let mut ch = Channel::new(2);
        assert_eq!(ch.receive(7), ReceiveOutcome::Blocked);
        assert_eq!(
            ch.send(3, num(5.0)),
            SendOutcome::Delivered {
                receiver: 7,
                value: num(5.0)
            }
        );
        assert_eq!(ch.buffered(), 0);
    }

    #[test]
    fn test_buffered_capacity() {
        let mut ch = Channel::new(2);
        assert_eq!(ch.send(1, num(1.0)), SendOutcome::Buffered);
        assert_eq!(ch.send(1, num(2.0)), SendOutcome::Buffered);
        assert_eq!(ch.send(1, num(3.0)), SendOutcome::Blocked);
        assert_eq!(ch.capacity(), 2);

        // 取走缓冲区头部，挂起的值补入尾部，发送者被解除阻塞
        assert_eq!(
            ch.receive(0),
            ReceiveOutcome::Ready {
                value: num(1.0),
                unblocked: Some(1)
            }
        );
        assert_eq!(ch.buffered(), 2);
        assert_eq!(ch.pending_senders(), 0);

        for expected in [2.0, 3.0] {
            assert_eq!(
                ch.receive(0),
                ReceiveOutcome::Ready {
                    value: num(expected),
                    unblocked: None
                }
            );
        }
    }
}

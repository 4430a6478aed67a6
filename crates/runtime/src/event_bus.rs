use std::collections::VecDeque;

/// An event tagged with its position in the bus's delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<E> {
    pub seq: u64,
    pub event: E,
}

/// Single-threaded FIFO event queue.
///
/// Host callbacks push events as they arrive; one dispatcher drains them and
/// runs each handler to completion before the next. Events from different
/// sources interleave in arrival order; no other ordering is implied.
#[derive(Debug)]
pub struct EventBus<E> {
    next_seq: u64,
    queue: VecDeque<Sequenced<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn emit(&mut self, event: E) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(Sequenced { seq, event });
        seq
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pop(&mut self) -> Option<Sequenced<E>> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Sequenced<E>> {
        self.queue.drain(..).collect()
    }

    /// Total number of events ever emitted.
    pub fn emitted(&self) -> u64 {
        self.next_seq
    }
}

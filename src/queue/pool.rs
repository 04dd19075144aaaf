//! Element pool
//!
//! Free lists for message buffers and boxed pipeline elements. The pool keeps
//! a count of objects currently handed out so a pipeline that leaks buffers
//! (for example, an abandoned queue that was never drained) shows up as a
//! non-zero count once all work is done.

use crate::core::sync::lock_or_recover;
use crate::queue::element::{HandshakeElement, InboundElement, MessageBuffer, OutboundElement};
use crate::queue::traits::Recycler;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Default upper bound on idle objects kept per free list
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// Objects currently handed out by an [`ElementPool`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub buffers_outstanding: usize,
    pub inbound_outstanding: usize,
    pub outbound_outstanding: usize,
}

impl PoolStats {
    pub fn total_outstanding(&self) -> usize {
        self.buffers_outstanding + self.inbound_outstanding + self.outbound_outstanding
    }
}

struct FreeList<T> {
    name: &'static str,
    idle: Mutex<Vec<T>>,
    outstanding: AtomicUsize,
    max_idle: usize,
}

impl<T> FreeList<T> {
    fn new(name: &'static str, max_idle: usize) -> Self {
        Self {
            name,
            idle: Mutex::new(Vec::new()),
            outstanding: AtomicUsize::new(0),
            max_idle,
        }
    }

    fn acquire(&self, make: impl FnOnce() -> T) -> T {
        let reused = lock_or_recover(&self.idle, self.name).pop();
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        reused.unwrap_or_else(make)
    }

    fn release(&self, item: T) {
        let released = self
            .outstanding
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if released.is_err() {
            log::warn!("{} pool: release without a matching acquire", self.name);
        }

        let mut idle = lock_or_recover(&self.idle, self.name);
        if idle.len() < self.max_idle {
            idle.push(item);
        }
    }

    fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    fn idle(&self) -> usize {
        lock_or_recover(&self.idle, self.name).len()
    }
}

/// Pool of message buffers and pipeline elements
pub struct ElementPool {
    buffers: FreeList<MessageBuffer>,
    inbound: FreeList<Box<InboundElement>>,
    outbound: FreeList<Box<OutboundElement>>,
}

impl ElementPool {
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            buffers: FreeList::new("buffer", max_idle),
            inbound: FreeList::new("inbound element", max_idle),
            outbound: FreeList::new("outbound element", max_idle),
        }
    }

    pub fn get_message_buffer(&self) -> MessageBuffer {
        self.buffers.acquire(MessageBuffer::new)
    }

    pub fn put_message_buffer(&self, buffer: MessageBuffer) {
        self.buffers.release(buffer);
    }

    pub fn get_inbound_element(&self) -> Box<InboundElement> {
        self.inbound.acquire(Box::default)
    }

    pub fn put_inbound_element(&self, mut element: Box<InboundElement>) {
        element.clear();
        self.inbound.release(element);
    }

    pub fn get_outbound_element(&self) -> Box<OutboundElement> {
        self.outbound.acquire(Box::default)
    }

    pub fn put_outbound_element(&self, mut element: Box<OutboundElement>) {
        element.clear();
        self.outbound.release(element);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            buffers_outstanding: self.buffers.outstanding(),
            inbound_outstanding: self.inbound.outstanding(),
            outbound_outstanding: self.outbound.outstanding(),
        }
    }

    /// Number of idle buffers ready for reuse
    pub fn idle_buffers(&self) -> usize {
        self.buffers.idle()
    }
}

impl Default for ElementPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Recycler<Box<InboundElement>> for ElementPool {
    fn recycle(&self, mut element: Box<InboundElement>) {
        if let Some(buffer) = element.buffer.take() {
            self.put_message_buffer(buffer);
        }
        self.put_inbound_element(element);
    }
}

impl Recycler<Box<OutboundElement>> for ElementPool {
    fn recycle(&self, mut element: Box<OutboundElement>) {
        if let Some(buffer) = element.buffer.take() {
            self.put_message_buffer(buffer);
        }
        self.put_outbound_element(element);
    }
}

impl Recycler<HandshakeElement> for ElementPool {
    fn recycle(&self, mut element: HandshakeElement) {
        if let Some(buffer) = element.buffer.take() {
            self.put_message_buffer(buffer);
        }
    }
}

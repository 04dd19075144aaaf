//! Reference-counted, auto-closing bounded queue
//!
//! A queue starts with one reference held by its creator. Every task that
//! will send registers itself first and finishes when its last send is done;
//! the creator finishes once it will register no one else. A closer task
//! spawned at construction waits for the count to reach zero and is the only
//! code that ever closes the channel, so close happens exactly once and never
//! overlaps a legitimate send.
//!
//! ```rust,no_run
//! use tunnelq::queue::RefCountedQueue;
//!
//! # async fn example() {
//! let queue = RefCountedQueue::new("outbound", 1024);
//!
//! let producer = queue.producer();
//! tokio::spawn(async move {
//!     producer.send(42u32).await;
//!     // dropping the guard finishes this producer
//! });
//!
//! // The creator registers no further producers
//! queue.finish();
//!
//! while let Some(value) = queue.receive().await {
//!     println!("got {}", value);
//! }
//! # }
//! ```

use crate::queue::channel::BoundedChannel;
use crate::queue::error::{QueueResult, SendError};
use crate::queue::liveness::Liveness;
use std::sync::{Arc, Weak};

/// Bounded multi-producer, multi-consumer queue that closes itself after its
/// last producer finishes
///
/// Cloning produces another handle to the same queue; it does not register a
/// producer.
pub struct RefCountedQueue<T> {
    channel: Arc<BoundedChannel<T>>,
    liveness: Arc<Liveness>,
}

impl<T> Clone for RefCountedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
            liveness: Arc::clone(&self.liveness),
        }
    }
}

impl<T: Send + 'static> RefCountedQueue<T> {
    /// Create a queue holding the creator's reference and start its closer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let channel = Arc::new(BoundedChannel::new(name, capacity));
        let liveness = Arc::new(Liveness::new());

        spawn_closer(Arc::downgrade(&channel), Arc::clone(&liveness));
        log::debug!(
            "queue '{}' created (capacity {})",
            channel.name(),
            channel.capacity()
        );

        Self { channel, liveness }
    }
}

impl<T> RefCountedQueue<T> {
    pub fn name(&self) -> &str {
        self.channel.name()
    }

    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    /// Number of elements currently buffered
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the closer has closed the channel
    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Current liveness count (creator reference plus live producers)
    pub fn liveness(&self) -> usize {
        self.liveness.current()
    }

    /// Register a producer
    ///
    /// Call before the producer's first send, and before the creator's own
    /// `finish()` unless ordering is otherwise guaranteed.
    ///
    /// # Panics
    ///
    /// Panics if the liveness count has already reached zero.
    pub fn register_producer(&self) {
        self.liveness.acquire(self.channel.name());
    }

    /// Drop one reference: the creator's, or a registered producer's
    ///
    /// # Panics
    ///
    /// Panics when called more often than `register_producer()` + 1.
    pub fn finish(&self) {
        self.liveness.release(self.channel.name());
    }

    /// Register a producer and return a guard that finishes it when dropped
    pub fn producer(&self) -> ProducerGuard<T> {
        self.register_producer();
        ProducerGuard {
            queue: self.clone(),
            finished: false,
        }
    }

    /// Enqueue an element, suspending while the queue is full
    ///
    /// # Panics
    ///
    /// Panics if the queue is closed, which means the caller sent without a
    /// live registration.
    pub async fn send(&self, element: T) {
        if let Err(err) = self.channel.send(element).await {
            send_on_closed(err);
        }
    }

    /// Enqueue without waiting; a full queue hands the element back
    ///
    /// # Panics
    ///
    /// Panics if the queue is closed.
    pub fn try_send(&self, element: T) -> Result<(), SendError<T>> {
        match self.channel.try_send(element) {
            Err(err) if err.is_closed() => send_on_closed(err),
            other => other,
        }
    }

    /// Receive the next element in FIFO order
    ///
    /// Suspends while the queue is empty and still open. Returns `None` once
    /// the queue is closed and every buffered element has been received.
    pub async fn receive(&self) -> Option<T> {
        self.channel.recv().await
    }

    /// Receive without waiting
    ///
    /// `QueueError::Empty` means nothing is buffered right now;
    /// `QueueError::Closed` means the queue is closed and drained.
    pub fn try_receive(&self) -> QueueResult<T> {
        self.channel.try_recv()
    }

    /// Wait until the queue has been closed
    pub async fn closed(&self) {
        self.channel.closed().await
    }
}

fn send_on_closed<T>(err: SendError<T>) -> ! {
    panic!(
        "{}: send after close; every producer must register before sending \
         and finish after its last send",
        err
    )
}

fn spawn_closer<T: Send + 'static>(channel: Weak<BoundedChannel<T>>, liveness: Arc<Liveness>) {
    tokio::spawn(async move {
        liveness.wait_for_zero().await;
        match channel.upgrade() {
            Some(channel) => {
                if channel.close() {
                    log::debug!(
                        "queue '{}' closed with {} element(s) left to drain",
                        channel.name(),
                        channel.len()
                    );
                }
            }
            None => log::trace!("queue released before its last producer finished"),
        }
    });
}

/// A registered producer of a [`RefCountedQueue`]
///
/// Finishes its registration exactly once: explicitly through
/// [`ProducerGuard::finish`] or implicitly on drop.
pub struct ProducerGuard<T> {
    queue: RefCountedQueue<T>,
    finished: bool,
}

impl<T> ProducerGuard<T> {
    pub fn queue(&self) -> &RefCountedQueue<T> {
        &self.queue
    }

    pub async fn send(&self, element: T) {
        self.queue.send(element).await
    }

    pub fn try_send(&self, element: T) -> Result<(), SendError<T>> {
        self.queue.try_send(element)
    }

    /// Finish this producer now
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.finished {
            self.finished = true;
            self.queue.finish();
        }
    }
}

impl<T> Drop for ProducerGuard<T> {
    fn drop(&mut self) {
        self.release();
    }
}

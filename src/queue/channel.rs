//! Bounded FIFO channel shared by both queue variants
//!
//! A `VecDeque` behind a mutex with two `Notify` wakers (room available,
//! element available) and a third one fired exactly once on close. The
//! channel supports any number of concurrent senders and receivers, a
//! non-blocking receive that distinguishes "empty right now" from "closed",
//! and an explicit close after which buffered elements remain receivable.
//!
//! Every waiting loop enables its `Notified` future before re-checking the
//! state under the lock, so a wake-up issued between the check and the await
//! is never lost.

use crate::core::sync::lock_or_recover;
use crate::queue::error::{QueueError, QueueResult, SendError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
}

pub(crate) struct BoundedChannel<T> {
    name: String,
    capacity: usize,
    state: Mutex<State<T>>,
    not_empty: Notify,
    not_full: Notify,
    closed_signal: Notify,
}

impl<T> BoundedChannel<T> {
    /// Create a channel with a fixed capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub(crate) fn new(name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        assert!(capacity > 0, "queue '{}' needs a non-zero capacity", name);
        Self {
            name,
            capacity,
            state: Mutex::new(State {
                buffer: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            closed_signal: Notify::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Enqueue without waiting
    pub(crate) fn try_send(&self, element: T) -> Result<(), SendError<T>> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(SendError::new(self.closed_error(), element));
            }
            if state.buffer.len() >= self.capacity {
                return Err(SendError::new(self.full_error(), element));
            }
            state.buffer.push_back(element);
        }
        self.not_empty.notify_one();
        Ok(())
    }

    /// Enqueue, suspending while the channel is full
    ///
    /// Fails only if the channel is (or becomes) closed.
    pub(crate) async fn send(&self, element: T) -> Result<(), SendError<T>> {
        let mut element = element;
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_send(element) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_full() => element = err.into_inner(),
                Err(err) => return Err(err),
            }

            notified.await;
        }
    }

    /// Enqueue, waiting at most `wait` for room
    pub(crate) async fn send_timeout(
        &self,
        element: T,
        wait: Duration,
    ) -> Result<(), SendError<T>> {
        let deadline = Instant::now() + wait;
        let mut element = element;
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_send(element) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_full() => element = err.into_inner(),
                Err(err) => return Err(err),
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                // Room may have appeared right at the deadline
                return match self.try_send(element) {
                    Err(err) if err.is_full() => Err(SendError::new(
                        QueueError::Timeout {
                            queue: self.name.clone(),
                            waited: wait,
                        },
                        err.into_inner(),
                    )),
                    other => other,
                };
            }
        }
    }

    /// Dequeue without waiting
    ///
    /// Reports `Empty` while the channel is open and has nothing buffered,
    /// and `Closed` once it is closed and fully drained.
    pub(crate) fn try_recv(&self) -> QueueResult<T> {
        let element = {
            let mut state = self.lock();
            match state.buffer.pop_front() {
                Some(element) => element,
                None if state.closed => return Err(self.closed_error()),
                None => {
                    return Err(QueueError::Empty {
                        queue: self.name.clone(),
                    })
                }
            }
        };
        self.not_full.notify_one();
        Ok(element)
    }

    /// Dequeue, suspending while the channel is empty and open
    ///
    /// Returns `None` once the channel is closed and drained.
    pub(crate) async fn recv(&self) -> Option<T> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_recv() {
                Ok(element) => return Some(element),
                Err(QueueError::Closed { .. }) => return None,
                Err(_) => {}
            }

            notified.await;
        }
    }

    /// Mark the channel closed and wake every waiter
    ///
    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn close(&self) -> bool {
        let newly_closed = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.closed, true)
        };
        if newly_closed {
            self.not_empty.notify_waiters();
            self.not_full.notify_waiters();
            self.closed_signal.notify_waiters();
        }
        newly_closed
    }

    /// Wait until the channel has been closed
    pub(crate) async fn closed(&self) {
        loop {
            let notified = self.closed_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_closed() {
                return;
            }

            notified.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<T>> {
        lock_or_recover(&self.state, &self.name)
    }

    fn full_error(&self) -> QueueError {
        QueueError::Full {
            queue: self.name.clone(),
            capacity: self.capacity,
        }
    }

    fn closed_error(&self) -> QueueError {
        QueueError::Closed {
            queue: self.name.clone(),
        }
    }
}

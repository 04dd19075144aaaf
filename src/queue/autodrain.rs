//! Auto-draining queue
//!
//! For queues whose producers and consumers cannot be enumerated, so no
//! registration discipline is possible. The channel is never closed. Every
//! handle shares ownership of one wrapper; when the last handle is dropped the
//! wrapper drains whatever is still buffered and passes each element to the
//! recycler, so pooled buffers are not leaked.
//!
//! Cooperating tasks signal shutdown by sending the sentinel (`None` in the
//! raw receive API). Receivers treat it as a no-op marker, never as the end of
//! the channel.
//!
//! Sends are best-effort because there may be no receiver at all: a send that
//! cannot find room within the configured wait recycles the element and
//! reports [`SendOutcome::Dropped`].

use crate::queue::channel::BoundedChannel;
use crate::queue::error::{QueueResult, SendError};
use crate::queue::traits::Recycler;
use std::sync::Arc;
use std::time::Duration;

/// Result of a best-effort send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The element (or sentinel) was queued
    Sent,
    /// No room within the wait; the element was recycled
    Dropped,
}

struct Inner<E> {
    channel: BoundedChannel<Option<E>>,
    recycler: Arc<dyn Recycler<E>>,
    send_timeout: Duration,
}

impl<E> Drop for Inner<E> {
    fn drop(&mut self) {
        let mut recycled = 0usize;
        let mut sentinels = 0usize;

        // Non-blocking: stop at the first "empty right now"
        while let Ok(slot) = self.channel.try_recv() {
            match slot {
                Some(element) => {
                    self.recycler.recycle(element);
                    recycled += 1;
                }
                None => sentinels += 1,
            }
        }

        if recycled > 0 || sentinels > 0 {
            log::debug!(
                "queue '{}' reclaimed: recycled {} element(s), skipped {} sentinel(s)",
                self.channel.name(),
                recycled,
                sentinels
            );
        }
    }
}

/// Handle to a bounded queue that drains itself when the last handle drops
///
/// Clone the handle to share it; there is deliberately no way to close it.
pub struct AutodrainingQueue<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for AutodrainingQueue<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Send> AutodrainingQueue<E> {
    /// Create a queue
    ///
    /// `send_timeout` bounds how long a best-effort send waits for room
    /// before recycling its element.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        send_timeout: Duration,
        recycler: Arc<dyn Recycler<E>>,
    ) -> Self {
        let channel = BoundedChannel::new(name, capacity);
        log::debug!(
            "auto-draining queue '{}' created (capacity {}, send wait {:?})",
            channel.name(),
            capacity,
            send_timeout
        );
        Self {
            inner: Arc::new(Inner {
                channel,
                recycler,
                send_timeout,
            }),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.channel.name()
    }

    pub fn capacity(&self) -> usize {
        self.inner.channel.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live handles sharing this queue
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Best-effort send of an element
    pub async fn send(&self, element: E) -> SendOutcome {
        match self.send_slot(Some(element)).await {
            Ok(()) => SendOutcome::Sent,
            Err(err) => {
                log::debug!(
                    "queue '{}': {}; recycling dropped element",
                    self.name(),
                    err.error()
                );
                if let Some(element) = err.into_inner() {
                    self.inner.recycler.recycle(element);
                }
                SendOutcome::Dropped
            }
        }
    }

    /// Best-effort send of the sentinel
    pub async fn send_sentinel(&self) -> SendOutcome {
        match self.send_slot(None).await {
            Ok(()) => SendOutcome::Sent,
            Err(err) => {
                log::debug!("queue '{}': {}; sentinel dropped", self.name(), err.error());
                SendOutcome::Dropped
            }
        }
    }

    /// Enqueue an element or sentinel without waiting
    ///
    /// A full queue hands the slot back untouched; nothing is recycled.
    pub fn try_send(&self, slot: Option<E>) -> Result<(), SendError<Option<E>>> {
        self.inner.channel.try_send(slot)
    }

    /// Receive the next slot
    ///
    /// `None` is the sentinel, not the end of the queue: this queue never
    /// ends, so the call suspends for as long as nothing is buffered.
    pub async fn recv(&self) -> Option<E> {
        // Never closed, so the outer `None` cannot happen
        self.inner.channel.recv().await.flatten()
    }

    /// Receive the next element, skipping sentinels
    pub async fn recv_element(&self) -> E {
        loop {
            if let Some(element) = self.recv().await {
                return element;
            }
        }
    }

    /// Receive without waiting; `QueueError::Empty` when nothing is buffered
    pub fn try_recv(&self) -> QueueResult<Option<E>> {
        self.inner.channel.try_recv()
    }

    async fn send_slot(&self, slot: Option<E>) -> Result<(), SendError<Option<E>>> {
        if self.inner.send_timeout.is_zero() {
            self.inner.channel.try_send(slot)
        } else {
            self.inner
                .channel
                .send_timeout(slot, self.inner.send_timeout)
                .await
        }
    }
}

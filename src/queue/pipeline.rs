//! Pipeline queue kinds
//!
//! The tunnel pipeline uses three reference-counted queues (outbound packets
//! awaiting encryption, inbound packets awaiting decryption, handshake
//! messages) and two auto-draining variants for per-peer hand-offs whose
//! lifetime nobody tracks. They differ only in element type and capacity.

use crate::queue::autodrain::AutodrainingQueue;
use crate::queue::config::QueueConfig;
use crate::queue::element::{HandshakeElement, InboundElement, OutboundElement};
use crate::queue::pool::ElementPool;
use crate::queue::refcounted::RefCountedQueue;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Outbound,
    Inbound,
    Handshake,
}

impl QueueKind {
    pub fn name(&self) -> &'static str {
        match self {
            QueueKind::Outbound => "outbound",
            QueueKind::Inbound => "inbound",
            QueueKind::Handshake => "handshake",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type OutboundQueue = RefCountedQueue<Box<OutboundElement>>;
pub type InboundQueue = RefCountedQueue<Box<InboundElement>>;
pub type HandshakeQueue = RefCountedQueue<HandshakeElement>;

pub type AutodrainingInboundQueue = AutodrainingQueue<Box<InboundElement>>;
pub type AutodrainingOutboundQueue = AutodrainingQueue<Box<OutboundElement>>;

pub fn new_outbound_queue(config: &QueueConfig) -> OutboundQueue {
    RefCountedQueue::new(QueueKind::Outbound.name(), config.outbound_capacity)
}

pub fn new_inbound_queue(config: &QueueConfig) -> InboundQueue {
    RefCountedQueue::new(QueueKind::Inbound.name(), config.inbound_capacity)
}

pub fn new_handshake_queue(config: &QueueConfig) -> HandshakeQueue {
    RefCountedQueue::new(QueueKind::Handshake.name(), config.handshake_capacity)
}

/// Inbound queue that returns leftover elements to `pool` once abandoned
///
/// The returned queue must never be closed; senders signal shutdown with
/// the sentinel.
pub fn new_autodraining_inbound_queue(
    config: &QueueConfig,
    pool: Arc<ElementPool>,
) -> AutodrainingInboundQueue {
    AutodrainingQueue::new(
        "autodraining-inbound",
        config.inbound_capacity,
        config.autodrain_send_timeout(),
        pool,
    )
}

/// Outbound counterpart of [`new_autodraining_inbound_queue`]
///
/// All sends are best-effort because there may be no receivers.
pub fn new_autodraining_outbound_queue(
    config: &QueueConfig,
    pool: Arc<ElementPool>,
) -> AutodrainingOutboundQueue {
    AutodrainingQueue::new(
        "autodraining-outbound",
        config.outbound_capacity,
        config.autodrain_send_timeout(),
        pool,
    )
}

/// The device-wide set of reference-counted queues
///
/// Holds the creator reference of each queue. Hand clones of the queues to
/// workers, register producers as needed, then call [`PipelineQueues::close`]
/// once no further producers will be registered.
pub struct PipelineQueues {
    pub outbound: OutboundQueue,
    pub inbound: InboundQueue,
    pub handshake: HandshakeQueue,
}

impl PipelineQueues {
    /// Must be called from within a Tokio runtime
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            outbound: new_outbound_queue(config),
            inbound: new_inbound_queue(config),
            handshake: new_handshake_queue(config),
        }
    }

    /// Release the creator reference of every queue
    ///
    /// Each queue closes as soon as its remaining producers finish.
    pub fn close(self) {
        log::debug!("releasing creator references of pipeline queues");
        self.outbound.finish();
        self.inbound.finish();
        self.handshake.finish();
    }
}

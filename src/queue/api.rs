//! Public API for the queue system
//!
//! External modules should import from here rather than directly from the
//! internal modules. See the module documentation for usage and architecture.

// Queue variants
pub use crate::queue::autodrain::{AutodrainingQueue, SendOutcome};
pub use crate::queue::refcounted::{ProducerGuard, RefCountedQueue};

// Pipeline kinds and constructors
pub use crate::queue::pipeline::{
    new_autodraining_inbound_queue, new_autodraining_outbound_queue, new_handshake_queue,
    new_inbound_queue, new_outbound_queue, PipelineQueues, QueueKind,
};

// Elements and pooling
pub use crate::queue::element::{HandshakeElement, InboundElement, MessageBuffer, OutboundElement};
pub use crate::queue::pool::{ElementPool, PoolStats};
pub use crate::queue::traits::Recycler;

// Configuration
pub use crate::queue::config::{ConfigError, QueueConfig};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult, SendError};

//! Pipeline Queue Component
//!
//! Bounded queues that hand packets and handshake messages between the
//! producer and consumer stages of a tunnel's processing pipeline, without
//! requiring callers to run an explicit shutdown protocol.
//!
//! # Overview
//!
//! - **Reference-counted queues** ([`RefCountedQueue`]): any number of
//!   producers register, send, and finish independently. The queue closes
//!   itself exactly once, after the last of them finishes. Consumers drain
//!   what is buffered and then see the end of the stream.
//! - **Auto-draining queues** ([`AutodrainingQueue`]): never closed. When the
//!   last handle is dropped, buffered elements go back to the pool through a
//!   [`Recycler`]. Shutdown between tasks is signalled with a sentinel.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐  ┌────────────┐
//! │ Producer A │  │ Producer B │  │  Creator   │
//! └─────┬──────┘  └─────┬──────┘  └─────┬──────┘
//!  register/send/finish │          finish (once)
//!       ▼               ▼               ▼
//! ┌────────────────────────────────────────────┐
//! │ RefCountedQueue                            │
//! │   liveness: 3 → 2 → 1 → 0 ──► closer task  │
//! │   ┌───┬───┬───┬───┬───┐          │ close   │
//! │   │ 1 │ 2 │ 3 │ 4 │...│ ◄────────┘         │
//! │   └───┴───┴───┴───┴───┘                    │
//! └──────────────┬─────────────────────────────┘
//!                │ receive() until closed + drained
//!        ┌───────┴───────┐
//!  ┌─────┴─────┐   ┌─────┴─────┐
//!  │ Worker 1  │   │ Worker 2  │
//!  └───────────┘   └───────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tunnelq::queue::{new_outbound_queue, ElementPool, QueueConfig};
//!
//! # async fn example() {
//! let config = QueueConfig::default();
//! let pool = ElementPool::new();
//! let queue = new_outbound_queue(&config);
//!
//! let producer = queue.producer();
//! let mut element = pool.get_outbound_element();
//! element.buffer = Some(pool.get_message_buffer());
//! producer.send(element).await;
//! drop(producer);
//!
//! queue.finish();
//! while let Some(element) = queue.receive().await {
//!     // encrypt, then recycle
//!     # let _ = element;
//! }
//! # }
//! ```

pub mod api;
mod autodrain;
mod channel;
mod config;
mod element;
mod error;
mod liveness;
mod pipeline;
mod pool;
mod refcounted;
mod traits;

pub use autodrain::{AutodrainingQueue, SendOutcome};
pub use config::{
    default_config_path, ConfigError, QueueConfig, DEFAULT_AUTODRAIN_SEND_TIMEOUT_MS,
    DEFAULT_QUEUE_CAPACITY,
};
pub use element::{
    HandshakeElement, InboundElement, MessageBuffer, OutboundElement, MAX_MESSAGE_SIZE,
};
pub use error::{QueueError, QueueResult, SendError};
pub use pipeline::{
    new_autodraining_inbound_queue, new_autodraining_outbound_queue, new_handshake_queue,
    new_inbound_queue, new_outbound_queue, AutodrainingInboundQueue, AutodrainingOutboundQueue,
    HandshakeQueue, InboundQueue, OutboundQueue, PipelineQueues, QueueKind,
};
pub use pool::{ElementPool, PoolStats, DEFAULT_MAX_IDLE};
pub use refcounted::{ProducerGuard, RefCountedQueue};
pub use traits::Recycler;

#[cfg(test)]
mod tests;

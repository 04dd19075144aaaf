//! Pipeline elements carried by the queues
//!
//! Elements own the pooled message buffer holding their packet. Outbound and
//! inbound elements travel boxed so the struct itself can be pooled too;
//! handshake elements travel by value.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Largest message a pipeline buffer can hold
pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Fixed-size, pooled byte buffer
pub struct MessageBuffer(Box<[u8]>);

impl MessageBuffer {
    pub fn new() -> Self {
        Self(vec![0u8; MAX_MESSAGE_SIZE].into_boxed_slice())
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MessageBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for MessageBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl fmt::Debug for MessageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Packet awaiting encryption
#[derive(Debug, Default)]
pub struct OutboundElement {
    pub buffer: Option<MessageBuffer>,
    pub packet_len: usize,
    pub nonce: u64,
}

impl OutboundElement {
    /// The packet bytes currently held, if any
    pub fn packet(&self) -> &[u8] {
        packet_slice(&self.buffer, self.packet_len)
    }

    pub(crate) fn clear(&mut self) {
        self.buffer = None;
        self.packet_len = 0;
        self.nonce = 0;
    }
}

/// Packet awaiting decryption
#[derive(Debug, Default)]
pub struct InboundElement {
    pub buffer: Option<MessageBuffer>,
    pub packet_len: usize,
    pub counter: u64,
}

impl InboundElement {
    pub fn packet(&self) -> &[u8] {
        packet_slice(&self.buffer, self.packet_len)
    }

    pub(crate) fn clear(&mut self) {
        self.buffer = None;
        self.packet_len = 0;
        self.counter = 0;
    }
}

/// Handshake message awaiting processing
#[derive(Debug, Default)]
pub struct HandshakeElement {
    pub msg_type: u32,
    pub buffer: Option<MessageBuffer>,
    pub packet_len: usize,
}

impl HandshakeElement {
    pub fn packet(&self) -> &[u8] {
        packet_slice(&self.buffer, self.packet_len)
    }
}

fn packet_slice(buffer: &Option<MessageBuffer>, len: usize) -> &[u8] {
    match buffer {
        Some(buffer) => &buffer[..len.min(buffer.len())],
        None => &[],
    }
}

//! Common test utilities and helpers

use std::sync::Arc;
use tunnelq::queue::{ElementPool, InboundElement, OutboundElement, QueueConfig};

/// Small capacities so backpressure shows up quickly
pub fn small_config() -> QueueConfig {
    QueueConfig {
        outbound_capacity: 4,
        inbound_capacity: 4,
        handshake_capacity: 2,
        autodrain_send_timeout_ms: 1,
    }
}

/// Outbound element carrying `nonce` as its one-byte payload
pub fn outbound_packet(pool: &Arc<ElementPool>, nonce: u64) -> Box<OutboundElement> {
    let mut element = pool.get_outbound_element();
    let mut buffer = pool.get_message_buffer();
    buffer[0] = nonce as u8;
    element.buffer = Some(buffer);
    element.packet_len = 1;
    element.nonce = nonce;
    element
}

pub fn inbound_packet(pool: &Arc<ElementPool>, counter: u64) -> Box<InboundElement> {
    let mut element = pool.get_inbound_element();
    element.buffer = Some(pool.get_message_buffer());
    element.counter = counter;
    element
}

//! Simulated packet flow through the pipeline queues
//!
//! Producers fill outbound elements from the pool and push them through the
//! outbound queue; a fixed worker pool drains it until the queue closes and
//! recycles every element. Each producer also submits one handshake message.
//! Finally a stray task writes into an auto-draining inbound queue that nobody
//! reads, and abandons it, so its contents must come back through reclamation.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tunnelq::queue::{
    new_autodraining_inbound_queue, ElementPool, HandshakeElement, PipelineQueues, PoolStats,
    QueueConfig, Recycler, SendOutcome,
};

/// Packets sent into the abandoned auto-draining queue
const STRAY_PACKETS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    pub producers: usize,
    pub consumers: usize,
    pub packets_per_producer: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub packets_sent: usize,
    pub packets_processed: usize,
    pub handshakes_processed: usize,
    pub stray_sent: usize,
    pub stray_dropped: usize,
    pub pool: PoolStats,
    pub elapsed: Duration,
}

impl SimulationReport {
    /// True when every packet arrived and nothing is still held outside the pool
    pub fn is_clean(&self) -> bool {
        self.packets_sent == self.packets_processed && self.pool.total_outstanding() == 0
    }

    pub fn log_summary(&self) {
        log::info!(
            "Processed {}/{} packets and {} handshakes in {:?}",
            self.packets_processed,
            self.packets_sent,
            self.handshakes_processed,
            self.elapsed
        );
        log::info!(
            "Abandoned queue: {} sent, {} dropped on a full queue",
            self.stray_sent,
            self.stray_dropped
        );
        if self.pool.total_outstanding() == 0 {
            log::info!("Element pool balanced: nothing outstanding");
        } else {
            log::warn!("Element pool leaked: {:?}", self.pool);
        }
    }
}

pub async fn run(config: &QueueConfig, settings: &SimulationSettings) -> SimulationReport {
    let started = Instant::now();
    let pool = Arc::new(ElementPool::new());
    let queues = PipelineQueues::new(config);

    let mut workers = JoinSet::new();
    for worker_id in 0..settings.consumers {
        let queue = queues.outbound.clone();
        let pool = Arc::clone(&pool);
        workers.spawn(async move {
            let mut processed = 0usize;
            while let Some(element) = queue.receive().await {
                // Stand-in for the encryption stage
                let _checksum: u32 = element.packet().iter().map(|&b| b as u32).sum();
                pool.recycle(element);
                processed += 1;
            }
            log::debug!("worker {} done after {} packet(s)", worker_id, processed);
            processed
        });
    }

    let handshake_worker = {
        let queue = queues.handshake.clone();
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            let mut processed = 0usize;
            while let Some(element) = queue.receive().await {
                pool.recycle(element);
                processed += 1;
            }
            processed
        })
    };

    let mut producers = JoinSet::new();
    for producer_id in 0..settings.producers {
        let outbound = queues.outbound.producer();
        let handshake = queues.handshake.producer();
        let pool = Arc::clone(&pool);
        let packets = settings.packets_per_producer;
        producers.spawn(async move {
            let mut buffer = pool.get_message_buffer();
            buffer[0] = producer_id as u8;
            handshake
                .send(HandshakeElement {
                    msg_type: 1,
                    buffer: Some(buffer),
                    packet_len: 1,
                })
                .await;
            handshake.finish();

            for nonce in 0..packets {
                let mut element = pool.get_outbound_element();
                let mut buffer = pool.get_message_buffer();
                buffer[..8].copy_from_slice(&(nonce as u64).to_le_bytes());
                element.buffer = Some(buffer);
                element.packet_len = 8;
                element.nonce = nonce as u64;
                outbound.send(element).await;
            }
            log::debug!("producer {} sent {} packet(s)", producer_id, packets);
        });
    }

    // Every producer is registered; the queues may close once they finish
    queues.close();

    let (stray_sent, stray_dropped) = run_stray_sender(config, &pool).await;

    while let Some(result) = producers.join_next().await {
        if let Err(e) = result {
            log::error!("producer task failed: {}", e);
        }
    }

    let mut packets_processed = 0;
    while let Some(result) = workers.join_next().await {
        match result {
            Ok(processed) => packets_processed += processed,
            Err(e) => log::error!("worker task failed: {}", e),
        }
    }

    let handshakes_processed = handshake_worker.await.unwrap_or_else(|e| {
        log::error!("handshake worker failed: {}", e);
        0
    });

    SimulationReport {
        packets_sent: settings.producers * settings.packets_per_producer,
        packets_processed,
        handshakes_processed,
        stray_sent,
        stray_dropped,
        pool: pool.stats(),
        elapsed: started.elapsed(),
    }
}

/// Write into an auto-draining queue nobody reads, then abandon it
async fn run_stray_sender(config: &QueueConfig, pool: &Arc<ElementPool>) -> (usize, usize) {
    let queue = new_autodraining_inbound_queue(config, Arc::clone(pool));
    let pool = Arc::clone(pool);

    let sender = tokio::spawn(async move {
        let (mut sent, mut dropped) = (0, 0);
        for counter in 0..STRAY_PACKETS {
            let mut element = pool.get_inbound_element();
            element.buffer = Some(pool.get_message_buffer());
            element.counter = counter;
            match queue.send(element).await {
                SendOutcome::Sent => sent += 1,
                SendOutcome::Dropped => dropped += 1,
            }
        }
        queue.send_sentinel().await;
        (sent, dropped)
    });

    match sender.await {
        Ok(counts) => counts,
        Err(e) => {
            log::error!("stray sender failed: {}", e);
            (0, 0)
        }
    }
}

//! Auto-draining queues returning elements to the pool

use crate::common::{inbound_packet, outbound_packet, small_config};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tunnelq::queue::{
    new_autodraining_inbound_queue, new_autodraining_outbound_queue, ElementPool, Recycler,
    SendOutcome,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_exit_then_abandon_recycles_leftovers() {
    let pool = Arc::new(ElementPool::new());
    let queue = new_autodraining_inbound_queue(&small_config(), Arc::clone(&pool));

    let worker = {
        let queue = queue.clone();
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            let mut seen = 0;
            while let Some(element) = queue.recv().await {
                pool.recycle(element);
                seen += 1;
            }
            seen
        })
    };

    for counter in 0..3 {
        queue.send(inbound_packet(&pool, counter)).await;
    }
    queue.send_sentinel().await;

    let seen = timeout(Duration::from_secs(1), worker)
        .await
        .expect("worker should stop at the sentinel")
        .unwrap();
    assert_eq!(seen, 3);

    // Late arrivals after the worker is gone
    queue.send(inbound_packet(&pool, 99)).await;
    drop(queue);

    assert_eq!(pool.stats().total_outstanding(), 0);
}

#[tokio::test]
async fn test_abandoned_queue_returns_buffers_and_elements() {
    let pool = Arc::new(ElementPool::new());
    let queue = new_autodraining_outbound_queue(&small_config(), Arc::clone(&pool));

    for nonce in 0..4 {
        assert_eq!(queue.send(outbound_packet(&pool, nonce)).await, SendOutcome::Sent);
    }
    assert_eq!(queue.len(), 4);
    assert_eq!(pool.stats().outbound_outstanding, 4);
    assert_eq!(pool.stats().buffers_outstanding, 4);

    drop(queue);

    assert_eq!(pool.stats().total_outstanding(), 0);
    assert_eq!(pool.idle_buffers(), 4);
}

#[tokio::test]
async fn test_best_effort_send_recycles_overflow() {
    let pool = Arc::new(ElementPool::new());
    let queue = new_autodraining_inbound_queue(&small_config(), Arc::clone(&pool));

    let mut outcomes = Vec::new();
    for counter in 0..7 {
        outcomes.push(queue.send(inbound_packet(&pool, counter)).await);
    }

    let sent = outcomes.iter().filter(|o| **o == SendOutcome::Sent).count();
    assert_eq!(sent, 4);
    assert_eq!(pool.stats().inbound_outstanding, 4, "dropped sends go straight back");

    drop(queue);
    assert_eq!(pool.stats().total_outstanding(), 0);
}

//! Producer registration, closing and consumer shutdown

use crate::common::{outbound_packet, small_config};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tunnelq::queue::{ElementPool, PipelineQueues, QueueError, RefCountedQueue, Recycler};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_workers_stop_once_every_producer_finishes() {
    let pool = Arc::new(ElementPool::new());
    let queues = PipelineQueues::new(&small_config());
    let outbound = queues.outbound.clone();

    let mut producers = Vec::new();
    for producer_id in 0..3u64 {
        let guard = outbound.producer();
        let pool = Arc::clone(&pool);
        producers.push(tokio::spawn(async move {
            for seq in 0..20u64 {
                guard.send(outbound_packet(&pool, producer_id * 100 + seq)).await;
            }
        }));
    }
    queues.close();

    let mut workers = Vec::new();
    for _ in 0..2 {
        let queue = outbound.clone();
        let pool = Arc::clone(&pool);
        workers.push(tokio::spawn(async move {
            let mut nonces = Vec::new();
            while let Some(element) = queue.receive().await {
                nonces.push(element.nonce);
                pool.recycle(element);
            }
            nonces
        }));
    }

    for producer in producers {
        producer.await.unwrap();
    }

    let mut received = Vec::new();
    for worker in workers {
        let nonces = timeout(Duration::from_secs(5), worker)
            .await
            .expect("workers should stop after the queue closes")
            .unwrap();
        received.extend(nonces);
    }

    assert_eq!(received.len(), 60);
    let mut by_producer: HashMap<u64, usize> = HashMap::new();
    for nonce in &received {
        *by_producer.entry(nonce / 100).or_default() += 1;
    }
    assert!(by_producer.values().all(|&count| count == 20));
    assert!(outbound.is_closed());
    assert_eq!(pool.stats().total_outstanding(), 0);
}

#[tokio::test]
async fn test_buffered_elements_survive_close() {
    let queue: RefCountedQueue<u32> = RefCountedQueue::new("buffered", 8);
    for value in 0..5 {
        queue.try_send(value).unwrap();
    }
    queue.finish();

    timeout(Duration::from_secs(1), queue.closed())
        .await
        .expect("queue should close");

    let mut drained = Vec::new();
    while let Some(value) = queue.receive().await {
        drained.push(value);
    }
    assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    assert!(matches!(queue.try_receive(), Err(QueueError::Closed { .. })));
}

#[tokio::test]
async fn test_liveness_tracks_registrations() {
    let queue: RefCountedQueue<u32> = RefCountedQueue::new("liveness", 1);
    assert_eq!(queue.liveness(), 1);

    queue.register_producer();
    queue.register_producer();
    assert_eq!(queue.liveness(), 3);

    queue.finish();
    queue.finish();
    assert_eq!(queue.liveness(), 1);
    assert!(!queue.is_closed());

    queue.finish();
    timeout(Duration::from_secs(1), queue.closed())
        .await
        .expect("queue should close at zero");
    assert_eq!(queue.liveness(), 0);
}

#[tokio::test]
async fn test_full_queue_reports_capacity() {
    let queue: RefCountedQueue<u32> = RefCountedQueue::new("tiny", 1);
    queue.try_send(1).unwrap();

    let err = queue.try_send(2).unwrap_err();
    assert!(err.is_full());
    assert_eq!(
        err.error(),
        &QueueError::Full {
            queue: "tiny".to_string(),
            capacity: 1,
        }
    );
    assert_eq!(err.into_inner(), 2);
    queue.finish();
}

//! Liveness counter for reference-counted queues
//!
//! Counts the creator reference plus every registered producer. The count
//! starts at one, only moves through atomic read-modify-write operations, and
//! reaching zero is terminal: neither registering past zero nor releasing
//! below zero is allowed, and both panic without touching the counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub(crate) struct Liveness {
    count: AtomicUsize,
    reached_zero: Notify,
}

impl Liveness {
    pub(crate) fn new() -> Self {
        Self {
            count: AtomicUsize::new(1),
            reached_zero: Notify::new(),
        }
    }

    pub(crate) fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Add one reference
    ///
    /// # Panics
    ///
    /// Panics if the count has already reached zero.
    pub(crate) fn acquire(&self, queue: &str) {
        let result = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                if count == 0 {
                    None
                } else {
                    count.checked_add(1)
                }
            });

        match result {
            Ok(previous) => {
                log::trace!("queue '{}': producer registered ({} live)", queue, previous + 1)
            }
            Err(0) => panic!(
                "register_producer() on queue '{}' after its liveness count reached zero",
                queue
            ),
            Err(_) => panic!("liveness count overflow on queue '{}'", queue),
        }
    }

    /// Drop one reference, returning `true` for the release that reached zero
    ///
    /// Release ordering makes every send performed before this call visible to
    /// whoever observes the zero with an acquire load.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero.
    pub(crate) fn release(&self, queue: &str) -> bool {
        let result = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));

        match result {
            Ok(1) => {
                log::trace!("queue '{}': last reference released", queue);
                // Stores a permit if the closer is not parked yet
                self.reached_zero.notify_one();
                true
            }
            Ok(previous) => {
                log::trace!("queue '{}': producer finished ({} live)", queue, previous - 1);
                false
            }
            Err(_) => panic!(
                "finish() on queue '{}' called more times than register_producer() + 1",
                queue
            ),
        }
    }

    /// Wait until the count reaches zero
    pub(crate) async fn wait_for_zero(&self) {
        loop {
            let notified = self.reached_zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.current() == 0 {
                return;
            }

            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_starts_with_creator_reference() {
        let liveness = Liveness::new();
        assert_eq!(liveness.current(), 1);
    }

    #[test]
    fn test_balanced_acquire_release() {
        let liveness = Liveness::new();
        liveness.acquire("q");
        liveness.acquire("q");
        assert_eq!(liveness.current(), 3);

        assert!(!liveness.release("q"));
        assert!(!liveness.release("q"));
        assert!(liveness.release("q"));
        assert_eq!(liveness.current(), 0);
    }

    #[test]
    #[should_panic(expected = "more times than register_producer")]
    fn test_release_below_zero_panics() {
        let liveness = Liveness::new();
        liveness.release("q");
        liveness.release("q");
    }

    #[test]
    fn test_release_below_zero_leaves_count_at_zero() {
        let liveness = Arc::new(Liveness::new());
        liveness.release("q");

        let clone = Arc::clone(&liveness);
        let outcome = std::thread::spawn(move || clone.release("q")).join();
        assert!(outcome.is_err());
        assert_eq!(liveness.current(), 0);
    }

    #[test]
    #[should_panic(expected = "after its liveness count reached zero")]
    fn test_acquire_after_zero_panics() {
        let liveness = Liveness::new();
        liveness.release("q");
        liveness.acquire("q");
    }

    #[tokio::test]
    async fn test_wait_for_zero_after_release() {
        let liveness = Arc::new(Liveness::new());
        liveness.acquire("q");

        let waiter = {
            let liveness = Arc::clone(&liveness);
            tokio::spawn(async move { liveness.wait_for_zero().await })
        };

        liveness.release("q");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished(), "one reference is still live");

        liveness.release("q");
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should observe zero")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_zero_when_already_zero() {
        let liveness = Liveness::new();
        liveness.release("q");
        timeout(Duration::from_millis(100), liveness.wait_for_zero())
            .await
            .expect("should return immediately");
    }
}

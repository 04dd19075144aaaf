//! Synchronisation utilities for robust mutex handling
//!
//! Queue internals hold their locks only for plain `VecDeque` and `Vec`
//! operations, so the protected data is consistent even if some unrelated
//! panic poisoned the lock. These helpers recover the guard and record the
//! event rather than propagating the poison.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// # Arguments
/// * `mutex` - The mutex to lock
/// * `context` - Short description of the owner, included in the warning
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use tunnelq::core::sync::lock_or_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_or_recover(&mutex, "example");
/// assert_eq!(*guard, 42);
/// ```
pub fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poison_err: PoisonError<MutexGuard<'a, T>>| {
        log::warn!(
            "Internal synchronisation error in {} (mutex poisoned); \
             continuing with recovered state",
            context
        );
        poison_err.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_or_recover_success() {
        let mutex = Mutex::new(42);
        let guard = lock_or_recover(&mutex, "test");
        assert_eq!(*guard, 42);
    }

    #[test]
    fn test_lock_or_recover_with_poisoned_mutex() {
        let mutex = Arc::new(Mutex::new(vec![1, 2, 3]));
        let mutex_clone = Arc::clone(&mutex);

        // Poison the mutex by panicking while holding the lock
        let _ = thread::spawn(move || {
            let _guard = mutex_clone.lock().unwrap();
            panic!("Intentional panic to poison mutex");
        })
        .join();

        assert!(mutex.is_poisoned());

        let mut guard = lock_or_recover(&mutex, "test");
        guard.push(4);
        assert_eq!(*guard, vec![1, 2, 3, 4]);
    }
}

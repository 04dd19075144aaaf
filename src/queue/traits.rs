//! Traits for the queue system
//!
//! The auto-draining queues never own pooled memory themselves; whatever they
//! still hold when their last handle goes away is handed to a [`Recycler`].

/// Returns elements (and the buffers they carry) to their pool
///
/// A single call recycles one element completely: implementations release the
/// element's buffer and then the element itself.
///
/// # Example Implementation
///
/// ```rust
/// use tunnelq::queue::Recycler;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct CountingRecycler {
///     recycled: AtomicUsize,
/// }
///
/// impl Recycler<Vec<u8>> for CountingRecycler {
///     fn recycle(&self, _element: Vec<u8>) {
///         self.recycled.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Recycler<E>: Send + Sync {
    /// Give the element back to its pool
    fn recycle(&self, element: E);
}

impl<E, F> Recycler<E> for F
where
    F: Fn(E) + Send + Sync,
{
    fn recycle(&self, element: E) {
        self(element)
    }
}

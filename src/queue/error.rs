//! Queue Error Types
//!
//! Only the non-blocking and bounded-wait operations report errors. Misuse of
//! the producer registration discipline is a bug in the caller and panics
//! instead of surfacing here.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue '{queue}' is full (capacity: {capacity})")]
    Full { queue: String, capacity: usize },

    #[error("Queue '{queue}' is empty")]
    Empty { queue: String },

    #[error("Queue '{queue}' is closed")]
    Closed { queue: String },

    #[error("Timed out after {waited:?} waiting for room in queue '{queue}'")]
    Timeout { queue: String, waited: Duration },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// A rejected send, handing the element back to the caller
#[derive(thiserror::Error)]
#[error("{error}")]
pub struct SendError<T> {
    error: QueueError,
    element: T,
}

impl<T> SendError<T> {
    pub(crate) fn new(error: QueueError, element: T) -> Self {
        Self { error, element }
    }

    pub fn error(&self) -> &QueueError {
        &self.error
    }

    pub fn is_full(&self) -> bool {
        matches!(self.error, QueueError::Full { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.error, QueueError::Closed { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.error, QueueError::Timeout { .. })
    }

    /// Take back ownership of the element that could not be queued
    pub fn into_inner(self) -> T {
        self.element
    }
}

// Elements are pooled buffers; printing them is never useful
impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_returns_element() {
        let err = SendError::new(
            QueueError::Full {
                queue: "outbound".to_string(),
                capacity: 4,
            },
            vec![1u8, 2, 3],
        );

        assert!(err.is_full());
        assert!(!err.is_closed());
        assert_eq!(err.to_string(), "Queue 'outbound' is full (capacity: 4)");
        assert_eq!(err.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_send_error_debug_hides_element() {
        struct Opaque;
        let err = SendError::new(
            QueueError::Closed {
                queue: "inbound".to_string(),
            },
            Opaque,
        );

        let debug = format!("{:?}", err);
        assert!(debug.contains("Closed"));
        assert!(debug.contains("inbound"));
    }
}

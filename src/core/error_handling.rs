//! Generic error handling utilities
//!
//! Distinguishes errors the user can fix (bad configuration values, malformed
//! files) from system failures, and logs each with the appropriate detail.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message, if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with the detail level its kind calls for
///
/// User-actionable errors log their own message; system errors log the
/// operation context. Full details always go to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use tunnelq::core::error_handling::log_error_with_context;
/// # use tunnelq::queue::QueueConfig;
/// if let Err(e) = QueueConfig::from_toml_str("inbound_capacity = 0") {
///     // Logs: "FATAL: inbound_capacity must be greater than zero"
///     log_error_with_context(&e, "Loading queue configuration");
/// }
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestSystemError {
        internal_details: String,
    }

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "System error: {}", self.internal_details)
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_system_error_uses_generic_context() {
        let error = TestSystemError {
            internal_details: "runtime unavailable".to_string(),
        };

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        // Must not panic without a logger installed
        log_error_with_context(&error, "Starting pipeline");
    }

    #[test]
    fn test_config_error_is_user_actionable() {
        let error = crate::queue::QueueConfig::from_toml_str("outbound_capacity = 0").unwrap_err();

        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message(),
            Some("outbound_capacity must be greater than zero")
        );
        log_error_with_context(&error, "Loading queue configuration");
    }
}

//! Retry utilities: backoff builders and retryable error classification.
//!
//! Uses `backon` for exponential backoff with jitter.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::interfaces::StorageError;

/// Backoff for database connection retries at startup.
///
/// - Min delay: 100ms
/// - Max delay: 5s
/// - Max attempts: 30
/// - Jitter enabled
pub fn connection_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(30)
        .with_jitter()
}

/// Determines if a connection error is worth retrying.
///
/// Retryable: I/O failures, pool timeouts and TLS handshakes that fail
/// while the database is still starting. Bad URLs, auth failures and
/// backends compiled out of this build are reported immediately.
pub fn is_retryable_connect_error(err: &StorageError) -> bool {
    match err {
        StorageError::Database(e) => matches!(
            e,
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
        ),
        _ => false,
    }
}

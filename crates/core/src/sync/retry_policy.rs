use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Extra attempts the API client makes for one logical request.
pub const MAX_REQUEST_RETRIES: u32 = 3;

/// Linear backoff unit between API client attempts.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// A queued item with this many recorded failures is dropped on its next failure.
pub const MAX_QUEUE_RETRY_ATTEMPTS: i32 = 3;

/// Retry policy classification for API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRetryClass {
    Retryable,
    Permanent,
}

/// Classify HTTP status into retry behavior.
pub fn classify_http_status(status: u16) -> SyncRetryClass {
    match status {
        408 | 429 => SyncRetryClass::Retryable,
        500..=599 => SyncRetryClass::Retryable,
        _ => SyncRetryClass::Permanent,
    }
}

pub fn is_transient_status(status: u16) -> bool {
    classify_http_status(status) == SyncRetryClass::Retryable
}

/// Delay before retry number `attempt` (1-based): `attempt × base`.
pub fn linear_backoff(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt)
}

/// Whether a queued item that just failed again should be dropped.
pub fn should_drop_queued(retries: i32) -> bool {
    retries >= MAX_QUEUE_RETRY_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_http_status_for_retry_policy() {
        assert_eq!(classify_http_status(500), SyncRetryClass::Retryable);
        assert_eq!(classify_http_status(503), SyncRetryClass::Retryable);
        assert_eq!(classify_http_status(429), SyncRetryClass::Retryable);
        assert_eq!(classify_http_status(408), SyncRetryClass::Retryable);
        assert_eq!(classify_http_status(400), SyncRetryClass::Permanent);
        assert_eq!(classify_http_status(404), SyncRetryClass::Permanent);
        assert_eq!(classify_http_status(409), SyncRetryClass::Permanent);
    }

    #[test]
    fn backoff_is_linear() {
        let base = Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS);
        assert_eq!(linear_backoff(1, base), Duration::from_secs(1));
        assert_eq!(linear_backoff(2, base), Duration::from_secs(2));
        assert_eq!(linear_backoff(3, base), Duration::from_secs(3));
    }

    #[test]
    fn queued_items_drop_at_ceiling() {
        assert!(!should_drop_queued(0));
        assert!(!should_drop_queued(2));
        assert!(should_drop_queued(3));
    }
}

//! Retry policy utilities for API requests.

use crate::error::ApiError;
use std::time::Duration;

/// Longest `Retry-After` we are willing to honor.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Bounded retry policy used by `ApiClient`.
#[derive(Clone, Copy, Debug)]
pub(super) struct RetryPolicy {
    /// Upper bound on total attempts, including the initial request.
    pub(super) max_attempts: u32,
    /// Delay used when the server gives no `Retry-After`.
    pub(super) backoff: Duration,
}

impl Default for RetryPolicy {
    /// One retry: a user is waiting at the prompt.
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Decide whether another retry attempt should be scheduled.
    pub(super) fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts && err.is_transient()
    }

    /// Compute retry delay, respecting `Retry-After` when present.
    pub(super) fn retry_delay_for(&self, err: &ApiError) -> Duration {
        match err.retry_after_secs() {
            Some(seconds) => Duration::from_secs(seconds.clamp(1, MAX_RETRY_AFTER_SECS)),
            None => self.backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_transient_status_once() {
        let policy = RetryPolicy::default();
        let rate_limited = ApiError::status(429, String::new(), None);
        assert!(policy.should_retry(&rate_limited, 0));
        assert!(!policy.should_retry(&rate_limited, 1));
        assert!(policy.should_retry(&ApiError::status(503, String::new(), None), 0));
    }

    #[test]
    fn never_retries_client_errors_or_bad_bodies() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&ApiError::status(400, String::new(), None), 0));
        assert!(!policy.should_retry(&ApiError::status(401, String::new(), None), 0));
        assert!(!policy.should_retry(&ApiError::InvalidResponse("x".into()), 0));
    }

    #[test]
    fn retry_after_is_clamped() {
        let policy = RetryPolicy::default();
        let delay = |secs| policy.retry_delay_for(&ApiError::status(429, String::new(), Some(secs)));
        assert_eq!(delay(0), Duration::from_secs(1));
        assert_eq!(delay(5), Duration::from_secs(5));
        assert_eq!(delay(3600), Duration::from_secs(30));
        assert_eq!(
            policy.retry_delay_for(&ApiError::status(500, String::new(), None)),
            policy.backoff
        );
    }
}

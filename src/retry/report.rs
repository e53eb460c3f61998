//! What a retry loop reports back.

use std::fmt;
use std::time::Duration;

use super::Retryable;

/// The final result of a retry loop along with metadata about the run.
///
/// # Examples
///
/// ```rust
/// use sluice::{Fallible, RetryPolicy};
/// use sluice::retry::retry_report;
///
/// let mut calls = 0;
/// let report = retry_report(&RetryPolicy::immediate().with_attempts(5), || {
///     calls += 1;
///     if calls == 2 { Fallible::valid("up") } else { Fallible::invalid() }
/// });
///
/// assert_eq!(report.result, Fallible::valid("up"));
/// assert_eq!(report.attempts, 2);
/// assert!(!report.cancelled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport<R> {
    /// The result of the last invocation.
    pub result: R,
    /// Number of invocations started, including the first.
    pub attempts: u32,
    /// Time from the first invocation to the end of the loop.
    pub total_duration: Duration,
    /// True if the loop ended because it was cancelled.
    pub cancelled: bool,
}

impl<R> RetryReport<R> {
    pub(crate) fn finished(result: R, attempts: u32, total_duration: Duration) -> Self {
        Self {
            result,
            attempts,
            total_duration,
            cancelled: false,
        }
    }

    /// Discard the metadata.
    pub fn into_result(self) -> R {
        self.result
    }

    /// Transform the result, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> RetryReport<U>
    where
        F: FnOnce(R) -> U,
    {
        RetryReport {
            result: f(self.result),
            attempts: self.attempts,
            total_duration: self.total_duration,
            cancelled: self.cancelled,
        }
    }
}

impl<R: Retryable> RetryReport<R> {
    /// Returns true if the last invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

impl<R: Retryable> fmt::Display for RetryReport<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.cancelled {
            "cancelled"
        } else if self.result.is_success() {
            "succeeded"
        } else {
            "exhausted"
        };
        write!(
            f,
            "retry {} after {} attempt{} ({:?})",
            outcome,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            self.total_duration
        )
    }
}

/// Information about a failed attempt, passed to retry hooks before the delay.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, R> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The result of the failed attempt.
    pub result: &'a R,
    /// Delay before the next attempt.
    pub next_delay: Duration,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fallible;

    #[test]
    fn test_display_variants() {
        let ok = RetryReport::finished(Fallible::valid(1), 1, Duration::from_millis(3));
        assert_eq!(ok.to_string(), "retry succeeded after 1 attempt (3ms)");

        let failed = RetryReport::finished(Fallible::<i32>::invalid(), 4, Duration::ZERO);
        assert_eq!(failed.to_string(), "retry exhausted after 4 attempts (0ns)");

        let cancelled = RetryReport {
            cancelled: true,
            ..RetryReport::finished(Fallible::<i32>::invalid(), 2, Duration::ZERO)
        };
        assert_eq!(cancelled.to_string(), "retry cancelled after 2 attempts (0ns)");
    }

    #[test]
    fn test_map_keeps_metadata() {
        let report = RetryReport::finished(Fallible::valid(2), 3, Duration::from_secs(1));
        let mapped = report.map(|r| r.map(|n| n * 10));

        assert_eq!(mapped.result, Fallible::valid(20));
        assert_eq!(mapped.attempts, 3);
        assert_eq!(mapped.total_duration, Duration::from_secs(1));
        assert!(mapped.is_success());
    }

    #[test]
    fn test_into_result() {
        let report = RetryReport::finished(Ok::<_, &str>(5), 1, Duration::ZERO);
        assert_eq!(report.into_result(), Ok(5));
    }
}

//! Retry loops, blocking and async.

use std::time::Instant;

use crate::fallible::Fallible;
use crate::outcome::Outcome;

use super::{RetryEvent, RetryPolicy, RetryReport};

/// A result type the retry loop knows how to judge.
pub trait Retryable {
    /// Returns true if the invocation succeeded and the loop should stop.
    fn is_success(&self) -> bool;
}

impl<T> Retryable for Fallible<T> {
    fn is_success(&self) -> bool {
        self.is_valid()
    }
}

impl<V, E> Retryable for Outcome<V, E> {
    fn is_success(&self) -> bool {
        self.is_value()
    }
}

impl<T, E> Retryable for Result<T, E> {
    fn is_success(&self) -> bool {
        self.is_ok()
    }
}

/// Invoke `f` until it succeeds or the policy's attempts are exhausted.
///
/// Blocks the calling thread during delays. On exhaustion the last failed
/// result is returned; nothing panics. Panics raised by `f` propagate.
///
/// # Examples
///
/// ```rust
/// use sluice::{retry, Fallible, RetryPolicy};
///
/// let mut counter = 0;
/// let result = retry(&RetryPolicy::immediate().with_attempts(3), || {
///     counter += 1;
///     if counter == 3 { Fallible::valid(42) } else { Fallible::invalid() }
/// });
///
/// assert_eq!(result, Fallible::valid(42));
/// assert_eq!(counter, 3);
/// ```
pub fn retry<R, F>(policy: &RetryPolicy, f: F) -> R
where
    R: Retryable,
    F: FnMut() -> R,
{
    retry_report(policy, f).result
}

/// Like [`retry`], calling `on_retry` after each failed attempt that will be
/// retried, before the delay.
pub fn retry_with_hooks<R, F, H>(policy: &RetryPolicy, f: F, on_retry: H) -> R
where
    R: Retryable,
    F: FnMut() -> R,
    H: FnMut(&RetryEvent<'_, R>),
{
    run_blocking(policy, f, on_retry).result
}

/// Like [`retry`], returning the attempt count and elapsed time as well.
pub fn retry_report<R, F>(policy: &RetryPolicy, f: F) -> RetryReport<R>
where
    R: Retryable,
    F: FnMut() -> R,
{
    run_blocking(policy, f, |_| {})
}

fn run_blocking<R, F, H>(policy: &RetryPolicy, mut f: F, mut on_retry: H) -> RetryReport<R>
where
    R: Retryable,
    F: FnMut() -> R,
    H: FnMut(&RetryEvent<'_, R>),
{
    let start = Instant::now();
    let mut attempt = 1u32;

    loop {
        let result = f();
        if result.is_success() {
            return RetryReport::finished(result, attempt, start.elapsed());
        }

        let Some(delay) = policy.delay_for_retry(attempt) else {
            let elapsed = start.elapsed();
            tracing::warn!(attempts = attempt, ?elapsed, "retry attempts exhausted");
            return RetryReport::finished(result, attempt, elapsed);
        };

        tracing::debug!(attempt, next_delay = ?delay, "attempt failed, retrying");
        on_retry(&RetryEvent {
            attempt,
            result: &result,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        attempt += 1;
    }
}

#[cfg(feature = "async")]
pub use self::nonblocking::*;

#[cfg(feature = "async")]
mod nonblocking {
    use std::future::Future;

    use tokio::time::Instant;

    use super::Retryable;
    use crate::fallible::Fallible;
    use crate::retry::{RetryEvent, RetryPolicy, RetryReport};

    /// Invoke `f` until its future resolves to success or the attempts are
    /// exhausted, suspending (not blocking) during delays.
    ///
    /// Same semantics as [`retry`](super::retry). Dropping the returned future
    /// cancels the loop: the in-flight attempt is dropped and no further
    /// attempts are made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::{retry_async, Fallible, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let mut calls = 0;
    /// let policy = RetryPolicy::exponential(Duration::from_millis(1)).with_attempts(4);
    /// let result = retry_async(&policy, || {
    ///     calls += 1;
    ///     let n = calls;
    ///     async move { if n < 3 { Err("not yet") } else { Ok(n) } }
    /// })
    /// .await;
    ///
    /// assert_eq!(result, Ok(3));
    /// # });
    /// ```
    pub async fn retry_async<R, F, Fut>(policy: &RetryPolicy, f: F) -> R
    where
        R: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = R>,
    {
        run_async(policy, f, |_| {}).await.result
    }

    /// Like [`retry_async`], calling `on_retry` after each failed attempt that
    /// will be retried, before the delay.
    pub async fn retry_async_with_hooks<R, F, Fut, H>(policy: &RetryPolicy, f: F, on_retry: H) -> R
    where
        R: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = R>,
        H: FnMut(&RetryEvent<'_, R>),
    {
        run_async(policy, f, on_retry).await.result
    }

    /// Like [`retry_async`], returning the attempt count and elapsed time as
    /// well.
    pub async fn retry_async_report<R, F, Fut>(policy: &RetryPolicy, f: F) -> RetryReport<R>
    where
        R: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = R>,
    {
        run_async(policy, f, |_| {}).await
    }

    /// Like [`retry_async_report`], but stops as soon as `cancel` resolves.
    ///
    /// Every attempt and every delay is raced against `cancel`. If it fires,
    /// the in-flight attempt is dropped, nothing is retried, and the report
    /// holds [`Fallible::Invalid`] with `cancelled` set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sluice::{Fallible, RetryPolicy};
    /// use sluice::retry::retry_async_until;
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let policy = RetryPolicy::fixed(Duration::from_secs(60)).with_attempts(10);
    /// let cancel = tokio::time::sleep(Duration::from_millis(5));
    ///
    /// let report =
    ///     retry_async_until(&policy, cancel, || async { Fallible::<()>::invalid() }).await;
    ///
    /// assert!(report.cancelled);
    /// assert_eq!(report.attempts, 1);
    /// assert!(report.result.is_invalid());
    /// # });
    /// ```
    pub async fn retry_async_until<T, F, Fut, C>(
        policy: &RetryPolicy,
        cancel: C,
        mut f: F,
    ) -> RetryReport<Fallible<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Fallible<T>>,
        C: Future,
    {
        let start = Instant::now();
        let mut attempt = 1u32;
        tokio::pin!(cancel);

        let cancelled = |attempt: u32| {
            let elapsed = start.elapsed();
            tracing::debug!(attempts = attempt, ?elapsed, "retry cancelled");
            RetryReport {
                result: Fallible::Invalid,
                attempts: attempt,
                total_duration: elapsed,
                cancelled: true,
            }
        };

        loop {
            let result = tokio::select! {
                biased;
                _ = &mut cancel => return cancelled(attempt),
                result = f() => result,
            };
            if result.is_valid() {
                return RetryReport::finished(result, attempt, start.elapsed());
            }

            let Some(delay) = policy.delay_for_retry(attempt) else {
                let elapsed = start.elapsed();
                tracing::warn!(attempts = attempt, ?elapsed, "retry attempts exhausted");
                return RetryReport::finished(result, attempt, elapsed);
            };

            tracing::debug!(attempt, next_delay = ?delay, "attempt failed, retrying");
            tokio::select! {
                biased;
                _ = &mut cancel => return cancelled(attempt),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    async fn run_async<R, F, Fut, H>(
        policy: &RetryPolicy,
        mut f: F,
        mut on_retry: H,
    ) -> RetryReport<R>
    where
        R: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = R>,
        H: FnMut(&RetryEvent<'_, R>),
    {
        let start = Instant::now();
        let mut attempt = 1u32;

        loop {
            let result = f().await;
            if result.is_success() {
                return RetryReport::finished(result, attempt, start.elapsed());
            }

            let Some(delay) = policy.delay_for_retry(attempt) else {
                let elapsed = start.elapsed();
                tracing::warn!(attempts = attempt, ?elapsed, "retry attempts exhausted");
                return RetryReport::finished(result, attempt, elapsed);
            };

            tracing::debug!(attempt, next_delay = ?delay, "attempt failed, retrying");
            on_retry(&RetryEvent {
                attempt,
                result: &result,
                next_delay: delay,
                elapsed: start.elapsed(),
            });

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_impls() {
        assert!(Fallible::valid(1).is_success());
        assert!(!Fallible::<i32>::invalid().is_success());
        assert!(Outcome::<i32, &str>::ok(1).is_success());
        assert!(!Outcome::<i32, &str>::fail("x").is_success());
        assert!(Ok::<_, ()>(1).is_success());
        assert!(!Err::<i32, _>(()).is_success());
    }
}

//! Integration tests for the retry engine combined with safe calls
#![cfg(feature = "async")]

use sluice::safe::{LoggerRegistry, SafeCall};
use sluice::{retry, retry_async, retry_async_report, Fallible, Outcome, RetryPolicy};
use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_retry_example_three_attempts() {
    let counter = Cell::new(0);
    let result = retry(&RetryPolicy::fixed(Duration::ZERO).with_attempts(3), || {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            Fallible::valid(42)
        } else {
            Fallible::invalid()
        }
    });

    assert_eq!(result, Fallible::valid(42));
    assert_eq!(counter.get(), 3);
}

#[test]
fn test_retry_safe_call_turns_panics_into_retries() {
    let registry = LoggerRegistry::new();
    let calls = Cell::new(0);

    let result = retry(&RetryPolicy::immediate().with_attempts(4), || {
        SafeCall::from_fn(&registry, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                panic!("flaky dependency");
            }
            "ok"
        })
        .into_fallible()
    });

    assert_eq!(result, Fallible::valid("ok"));
    assert_eq!(calls.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_async_retry_with_outcome_keeps_last_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let policy = RetryPolicy::exponential(Duration::from_millis(50)).with_attempts(3);

    let result = retry_async(&policy, move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Outcome::<(), String>::fail(format!("attempt {}", n)) }
    })
    .await;

    assert_eq!(result.error(), "attempt 3");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[cfg(feature = "jitter")]
#[tokio::test(start_paused = true)]
async fn test_async_retry_jittered_delays_stay_in_bounds() {
    let policy = RetryPolicy::exponential(Duration::from_secs(1))
        .with_attempts(4)
        .with_jitter();

    let report = retry_async_report(&policy, || async { Fallible::<()>::invalid() }).await;

    // 1s + 2s + 4s, each within ±10%
    assert_eq!(report.attempts, 4);
    assert!(report.total_duration >= Duration::from_millis(6300));
    assert!(report.total_duration <= Duration::from_millis(7800));
}

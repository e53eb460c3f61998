//! Retry for computations that report failure by value.
//!
//! A retry loop invokes a producer, inspects the result through [`Retryable`],
//! and re-invokes it after a policy-driven delay until it succeeds or the
//! attempt budget runs out. Exhaustion is not an error: the last failed result
//! is handed back as-is. The loop never catches panics.
//!
//! - **Pure policy**: [`RetryPolicy`] is just data and easy to test
//! - **Blocking and async forms** share the same timing: [`retry`] sleeps the
//!   thread, [`retry_async`] suspends on `tokio::time::sleep`
//! - **Observable**: hooks receive a [`RetryEvent`] before each delay, and the
//!   `*_report` variants return a [`RetryReport`]
//!
//! # Quick Start
//!
//! ```rust
//! use sluice::{Fallible, RetryPolicy};
//! use sluice::retry::retry;
//!
//! let mut calls = 0;
//! let result = retry(&RetryPolicy::immediate().with_attempts(3), || {
//!     calls += 1;
//!     Fallible::<u8>::invalid()
//! });
//!
//! assert!(result.is_invalid());
//! assert_eq!(calls, 3);
//! ```
//!
//! # Delay Strategies
//!
//! Retry `n` (1-based, not counting the first invocation) waits:
//!
//! - **Fixed**: the same delay every time
//! - **Exponential**: `base * 2^(n-1)` (100ms, 200ms, 400ms, ...)
//! - **Linear**: `base * n`
//! - **Fibonacci**: `base * fib(n)`
//! - **Custom**: any `fn(u32) -> Duration`
//!
//! # Jitter
//!
//! With the `jitter` feature (on by default), [`RetryPolicy::with_jitter`] spreads
//! each delay uniformly across ±10% of its nominal value. Delays never go
//! negative, and [`RetryPolicy::with_max_delay`] caps them after jitter.
//!
//! # Cancellation
//!
//! Dropping an async retry future stops it for good. For an explicit signal use
//! [`retry_async_until`], which reports a cancelled run rather than retrying it.

mod engine;
mod policy;
mod report;

pub use engine::{retry, retry_report, retry_with_hooks, Retryable};
#[cfg(feature = "async")]
pub use engine::{retry_async, retry_async_report, retry_async_until, retry_async_with_hooks};
pub use policy::{DelayStrategy, JitterStrategy, RetryPolicy, DEFAULT_JITTER_FACTOR};
pub use report::{RetryEvent, RetryReport};

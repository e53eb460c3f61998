//! # Sluice
//!
//! Failure as a value: containers and combinators for computations that may
//! fail, without using panics or early returns for control flow.
//!
//! ## What's inside
//!
//! - [`Fallible`]: a value or nothing (`Valid` / `Invalid`)
//! - [`Outcome`]: a value or an error. When two failed outcomes are combined,
//!   neither cause is lost: the second is kept in the first's aggregated errors
//! - Combinators, sync and async: [`bind`], [`zip_with`], [`CombineAll`],
//!   [`OutcomeFutureExt`]
//! - [`LazyOnce`] / [`LazyOnceAsync`]: memoizers whose producer runs exactly once,
//!   even under concurrent first reads
//! - [`SafeCall`] / [`SafeCallAsync`]: run host code, turn errors and panics into
//!   `Invalid`, and report them to a swappable logger
//! - [`retry`](retry::retry) / [`retry_async`]: re-invoke a computation with fixed,
//!   exponential, linear, or Fibonacci backoff and optional jitter
//!
//! ## Quick Example
//!
//! ```rust
//! use sluice::{zip_with, Outcome};
//!
//! fn parse_port(s: &str) -> Outcome<u16, String> {
//!     s.parse::<u16>().map_err(|_| format!("bad port: {}", s)).into()
//! }
//!
//! fn parse_host(s: &str) -> Outcome<String, String> {
//!     if s.is_empty() {
//!         Outcome::fail("empty host".to_string())
//!     } else {
//!         Outcome::ok(s.to_string())
//!     }
//! }
//!
//! // Both failures are reported, primary first
//! let addr = zip_with(parse_host(""), parse_port("http"), |h, p| format!("{}:{}", h, p));
//!
//! assert_eq!(
//!     addr.into_errors(),
//!     vec!["empty host".to_string(), "bad port: http".to_string()]
//! );
//! ```
//!
//! ## Features
//!
//! - `async` (default): async retry on tokio
//! - `jitter` (default): randomized retry delays
//! - `serde`: `Serialize`/`Deserialize` for the containers
//! - `proptest`: `Arbitrary` impls for property tests

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod fallible;
pub mod lazy;
pub mod outcome;
pub mod retry;
pub mod safe;
pub mod testing;

// Re-exports
pub use fallible::{Fallible, Status};
pub use lazy::{LazyOnce, LazyOnceAsync};
pub use outcome::{
    bind, bind_async, bind_convert, bind_pair, zip_with, BoxError, CombineAll, ErrorPair,
    FallibleFutureExt, Outcome, OutcomeFutureExt,
};
pub use retry::{retry, retry_report, retry_with_hooks, RetryPolicy, RetryReport, Retryable};
#[cfg(feature = "async")]
pub use retry::{retry_async, retry_async_report, retry_async_until, retry_async_with_hooks};
pub use safe::{Fault, LoggerRegistry, LoggerSnapshot, SafeCall, SafeCallAsync};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fallible::{Fallible, Status};
    pub use crate::lazy::{LazyOnce, LazyOnceAsync};
    pub use crate::outcome::{
        bind, bind_async, CombineAll, FallibleFutureExt, Outcome, OutcomeFutureExt,
    };
    pub use crate::retry::{retry, RetryPolicy, Retryable};
    #[cfg(feature = "async")]
    pub use crate::retry::retry_async;
    pub use crate::safe::{LoggerRegistry, SafeCall, SafeCallAsync};
}

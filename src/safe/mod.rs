//! Safe execution of host code.
//!
//! [`SafeCall`] and [`SafeCallAsync`] run a producer at most once, convert any
//! returned error or panic into [`Fallible::Invalid`](crate::Fallible::Invalid),
//! and report the captured [`Fault`] to a logger.
//!
//! # Logger snapshots
//!
//! Loggers live in a [`LoggerRegistry`], a single replaceable slot. A registry is
//! passed explicitly to every constructor, and the constructor captures the
//! logger that is installed *at that moment*. Replacing or removing the logger
//! afterwards does not change which logger sees the call's failure. Both the
//! sync and async forms follow this rule.
//!
//! ```
//! use sluice::safe::{LoggerRegistry, SafeCall};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let first = Arc::new(AtomicUsize::new(0));
//! let counter = first.clone();
//! let registry = LoggerRegistry::with_logger(move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let call = SafeCall::new(&registry, || Err::<(), _>("boom"));
//! registry.set(|_| panic!("never reached for `call`"));
//!
//! assert!(call.get().is_invalid());
//! assert_eq!(first.load(Ordering::SeqCst), 1);
//! ```
//!
//! Logging is best effort: a logger that panics is ignored and the call still
//! resolves to `Invalid`.

mod call;
mod fault;
mod logger;

pub use call::{SafeCall, SafeCallAsync};
pub use fault::Fault;
pub use logger::{log_fault, Logger, LoggerRegistry, LoggerSnapshot};

//! Lazily evaluated calls that turn raised failures into invalid containers.

use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::FutureExt;

use crate::fallible::{Fallible, Status};
use crate::lazy::{LazyOnce, LazyOnceAsync};
use crate::outcome::BoxError;

use super::{log_fault, Fault, LoggerRegistry, LoggerSnapshot};

type Thunk<'a, T> = Box<dyn FnOnce() -> Fallible<T> + 'a>;

/// A synchronous producer evaluated at most once, with errors and panics
/// captured.
///
/// The logger is snapshotted from the registry when the call is constructed.
/// On first read the producer runs; a returned error or a panic is reported to
/// that snapshot and the call resolves to [`Fallible::Invalid`].
///
/// # Examples
///
/// ```
/// use sluice::safe::{LoggerRegistry, SafeCall};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let registry = LoggerRegistry::with_logger(move |fault| {
///     sink.lock().unwrap().push(fault.to_string());
/// });
///
/// let call = SafeCall::new(&registry, || "12x".parse::<u32>());
///
/// assert!(call.get().is_invalid());
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct SafeCall<'a, T> {
    inner: LazyOnce<Fallible<T>, Thunk<'a, T>>,
}

impl<'a, T> SafeCall<'a, T> {
    /// Wrap a fallible producer, snapshotting the registry's logger now.
    pub fn new<F, E>(registry: &LoggerRegistry, producer: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + 'a,
        E: Into<BoxError>,
    {
        Self::with_snapshot(registry.snapshot(), producer)
    }

    /// Wrap a producer that can only fail by panicking.
    pub fn from_fn<F>(registry: &LoggerRegistry, producer: F) -> Self
    where
        F: FnOnce() -> T + 'a,
    {
        Self::with_snapshot(registry.snapshot(), move || {
            Ok::<_, std::convert::Infallible>(producer())
        })
    }

    /// Wrap a fallible producer with an explicit logger snapshot.
    pub fn with_snapshot<F, E>(logger: LoggerSnapshot, producer: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + 'a,
        E: Into<BoxError>,
    {
        let thunk: Thunk<'a, T> = Box::new(move || guard(&logger, producer));
        SafeCall {
            inner: LazyOnce::new(thunk),
        }
    }

    /// Evaluate on first call and return the cached result.
    pub fn get(&self) -> &Fallible<T> {
        self.inner.get()
    }

    /// Returns true once the producer has run.
    pub fn is_evaluated(&self) -> bool {
        self.inner.is_evaluated()
    }

    /// Consume the call, evaluating it if needed.
    pub fn into_fallible(self) -> Fallible<T> {
        self.inner.into_value()
    }
}

impl<'a> SafeCall<'a, ()> {
    /// Wrap an action with no return value. Resolves to a [`Status`].
    pub fn action<F, E>(registry: &LoggerRegistry, action: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + 'a,
        E: Into<BoxError>,
    {
        Self::new(registry, action)
    }

    /// Evaluate the action and report whether it completed.
    pub fn status(&self) -> Status {
        *self.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for SafeCall<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeCall")
            .field("result", &self.inner.get_if_evaluated())
            .finish()
    }
}

/// An async producer evaluated at most once, with errors and panics captured.
///
/// Same contract as [`SafeCall`]: the logger is snapshotted at construction,
/// and concurrent first reads share a single evaluation.
///
/// # Examples
///
/// ```
/// use sluice::safe::{LoggerRegistry, SafeCallAsync};
///
/// # tokio_test::block_on(async {
/// let registry = LoggerRegistry::new();
/// let call = SafeCallAsync::new(&registry, || async { Ok::<_, std::io::Error>(5) });
///
/// assert_eq!(call.get().await.value(), &5);
/// # });
/// ```
pub struct SafeCallAsync<T> {
    inner: LazyOnceAsync<Fallible<T>>,
}

impl<T> SafeCallAsync<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a fallible async producer, snapshotting the registry's logger now.
    pub fn new<F, Fut, E>(registry: &LoggerRegistry, producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::with_snapshot(registry.snapshot(), producer)
    }

    /// Wrap an async producer that can only fail by panicking.
    pub fn from_future_fn<F, Fut>(registry: &LoggerRegistry, producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::with_snapshot(registry.snapshot(), move || {
            producer().map(Ok::<_, std::convert::Infallible>)
        })
    }

    /// Wrap a fallible async producer with an explicit logger snapshot.
    pub fn with_snapshot<F, Fut, E>(logger: LoggerSnapshot, producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        SafeCallAsync {
            inner: LazyOnceAsync::new(move || guard_async(logger, producer)),
        }
    }

    /// Evaluate on first call and return the cached result.
    pub async fn get(&self) -> &Fallible<T> {
        self.inner.get().await
    }
}

impl SafeCallAsync<()> {
    /// Wrap an async action with no return value. Resolves to a [`Status`].
    pub fn action<F, Fut, E>(registry: &LoggerRegistry, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::new(registry, action)
    }

    /// Evaluate the action and report whether it completed.
    pub async fn status(&self) -> Status {
        *self.get().await
    }
}

impl<T> SafeCallAsync<T> {
    /// Returns true once the producer has completed.
    pub fn is_evaluated(&self) -> bool {
        self.inner.is_evaluated()
    }
}

impl<T: fmt::Debug> fmt::Debug for SafeCallAsync<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeCallAsync")
            .field("result", &self.inner.get_if_evaluated())
            .finish()
    }
}

fn guard<T, E, F>(logger: &LoggerSnapshot, producer: F) -> Fallible<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<BoxError>,
{
    let fault = match catch_unwind(AssertUnwindSafe(producer)) {
        Ok(Ok(value)) => return Fallible::Valid(value),
        Ok(Err(error)) => Fault::Error(error.into()),
        Err(payload) => Fault::from_panic(payload),
    };
    report(logger, &fault);
    Fallible::Invalid
}

async fn guard_async<T, E, F, Fut>(logger: LoggerSnapshot, producer: F) -> Fallible<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    let attempt = AssertUnwindSafe(async move { producer().await })
        .catch_unwind()
        .await;
    let fault = match attempt {
        Ok(Ok(value)) => return Fallible::Valid(value),
        Ok(Err(error)) => Fault::Error(error.into()),
        Err(payload) => Fault::from_panic(payload),
    };
    report(&logger, &fault);
    Fallible::Invalid
}

fn report(logger: &LoggerSnapshot, fault: &Fault) {
    tracing::debug!(%fault, panic = fault.is_panic(), "safe call captured a fault");
    log_fault(logger, fault);
}

//! Once-only lazy evaluation
//!
//! Two memoizers that defer a producer until the value is first read and then
//! cache the result:
//!
//! - [`LazyOnce`] is the single-threaded form. It is `!Sync`, so the compiler
//!   rejects sharing it between threads instead of letting concurrent first
//!   reads race.
//! - [`LazyOnceAsync`] is safe under concurrent first reads. The first reader
//!   starts the producer's future and publishes the *in-flight* computation
//!   before releasing its lock, so readers that arrive while it is running
//!   await the same computation instead of starting another.
//!
//! Both release the producer (and whatever it captured) as soon as the value
//! exists.
//!
//! # Examples
//!
//! ```
//! use sluice::LazyOnceAsync;
//!
//! # tokio_test::block_on(async {
//! let config = LazyOnceAsync::new(|| async { "loaded".to_string() });
//!
//! assert!(!config.is_evaluated());
//! assert_eq!(config.get().await, "loaded");
//! assert!(config.is_evaluated());
//! # });
//! ```

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, OnceLock, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

/// A value computed on first read by a producer that runs at most once.
///
/// Not thread-safe: the type is `!Sync`.
///
/// # Examples
///
/// ```
/// use sluice::LazyOnce;
/// use std::cell::Cell;
///
/// let runs = Cell::new(0);
/// let lazy = LazyOnce::new(|| {
///     runs.set(runs.get() + 1);
///     40 + 2
/// });
///
/// assert_eq!(*lazy.get(), 42);
/// assert_eq!(*lazy.get(), 42);
/// assert_eq!(runs.get(), 1);
/// ```
pub struct LazyOnce<T, F = fn() -> T> {
    cell: OnceCell<T>,
    producer: Cell<Option<F>>,
}

impl<T, F> LazyOnce<T, F>
where
    F: FnOnce() -> T,
{
    /// Wrap a producer without running it.
    pub fn new(producer: F) -> Self {
        LazyOnce {
            cell: OnceCell::new(),
            producer: Cell::new(Some(producer)),
        }
    }

    /// Read the value, running the producer on the first call.
    ///
    /// # Panics
    ///
    /// Panics if a previous evaluation panicked, or if the producer reads this
    /// same `LazyOnce` while it is running.
    pub fn get(&self) -> &T {
        self.cell.get_or_init(|| match self.producer.take() {
            Some(producer) => producer(),
            None => panic!("LazyOnce producer panicked during an earlier evaluation"),
        })
    }

    /// Consume the memoizer, evaluating it if needed.
    pub fn into_value(self) -> T {
        let LazyOnce { cell, producer } = self;
        match cell.into_inner() {
            Some(value) => value,
            None => match producer.into_inner() {
                Some(producer) => producer(),
                None => panic!("LazyOnce producer panicked during an earlier evaluation"),
            },
        }
    }
}

impl<T, F> LazyOnce<T, F> {
    /// Returns true once the producer has run to completion.
    pub fn is_evaluated(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Read the value without evaluating.
    pub fn get_if_evaluated(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for LazyOnce<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyOnce").field(value).finish(),
            None => f.write_str("LazyOnce(<unevaluated>)"),
        }
    }
}

type Producer<T> = Box<dyn FnOnce() -> BoxFuture<'static, T> + Send>;

enum State<T> {
    Pending(Producer<T>),
    Running(Shared<BoxFuture<'static, T>>),
    Poisoned,
    Done,
}

/// An async value computed on first read, exactly once, even when many tasks
/// read it concurrently.
///
/// # Examples
///
/// ```
/// use sluice::LazyOnceAsync;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// # tokio_test::block_on(async {
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = runs.clone();
/// let lazy = Arc::new(LazyOnceAsync::new(move || async move {
///     counter.fetch_add(1, Ordering::SeqCst);
///     7
/// }));
///
/// let (a, b) = futures::join!(lazy.get(), lazy.get());
/// assert_eq!((*a, *b), (7, 7));
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # });
/// ```
pub struct LazyOnceAsync<T> {
    value: OnceLock<T>,
    state: Mutex<State<T>>,
}

impl<T> LazyOnceAsync<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap an async producer without running it.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        LazyOnceAsync {
            value: OnceLock::new(),
            state: Mutex::new(State::Pending(Box::new(move || producer().boxed()))),
        }
    }

    /// Read the value, starting the producer on the first call.
    ///
    /// Concurrent callers that arrive before the value exists all await one
    /// shared computation.
    ///
    /// # Panics
    ///
    /// Panics if the producer panicked during an earlier evaluation, either
    /// while building its future or while that future was being polled.
    pub async fn get(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }

        let computation = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = self.value.get() {
                return value;
            }
            // Stays Poisoned if the producer panics before returning its future.
            match std::mem::replace(&mut *state, State::Poisoned) {
                State::Pending(producer) => {
                    tracing::trace!("starting lazy computation");
                    let running = producer().shared();
                    *state = State::Running(running.clone());
                    running
                }
                State::Running(running) => {
                    *state = State::Running(running.clone());
                    running
                }
                State::Poisoned => {
                    drop(state);
                    panic!("LazyOnceAsync producer panicked during an earlier evaluation")
                }
                State::Done => unreachable!("state is only Done after the value is published"),
            }
        };

        let computed = computation.await;
        let value = self.value.get_or_init(|| computed);
        // Drops the shared computation and everything the producer captured.
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = State::Done;
        value
    }
}

impl<T> LazyOnceAsync<T> {
    /// Returns true once the value has been published.
    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// Read the value without evaluating.
    pub fn get_if_evaluated(&self) -> Option<&T> {
        self.value.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyOnceAsync<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("LazyOnceAsync").field(value).finish(),
            None => f.write_str("LazyOnceAsync(<unevaluated>)"),
        }
    }
}

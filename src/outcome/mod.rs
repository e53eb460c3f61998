//! Value-or-error container that keeps every failure cause
//!
//! `Outcome<V, E>` is a tagged union of a value or an error. When two failed
//! outcomes are combined, the second failure is not thrown away: it is appended to
//! the first outcome's *aggregated* errors. See [`bind`] for the exact rules.
//!
//! # Examples
//!
//! ```
//! use sluice::Outcome;
//!
//! let host = Outcome::<&str, &str>::fail("missing host");
//! let port = Outcome::<u16, &str>::fail("missing port");
//!
//! let addr = host.zip_with(port, |h, p| format!("{}:{}", h, p));
//!
//! assert_eq!(addr.error(), &"missing host");
//! assert_eq!(addr.aggregated(), &["missing port"]);
//! ```

mod bind;
mod future;

pub use bind::{bind, bind_async, bind_convert, bind_pair, zip_with, CombineAll, ErrorPair};
pub use future::{FallibleFutureExt, OutcomeFutureExt};

use std::future::Future;

use futures::future::{self as futures_future, Either, FutureExt};

use crate::fallible::Fallible;

/// Boxed error used by the default [`Outcome`] error parameter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Either a value or an error plus the errors aggregated alongside it.
///
/// Exactly one variant holds. `aggregated` is empty unless the outcome was
/// produced by combining two outcomes that had both failed.
///
/// # Examples
///
/// ```
/// use sluice::Outcome;
///
/// let ok: Outcome<i32, String> = Outcome::ok(1);
/// let err: Outcome<i32, String> = Outcome::fail("boom".to_string());
///
/// assert!(ok.is_value());
/// assert!(err.is_error());
/// assert!(err.aggregated().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome<V, E = BoxError> {
    /// The computation produced a value
    Value(V),
    /// The computation failed
    Error {
        /// Primary cause
        error: E,
        /// Further causes collected when failed outcomes were combined
        aggregated: Vec<E>,
    },
}

impl<V, E> Outcome<V, E> {
    /// Create an outcome holding a value.
    #[inline]
    pub fn ok(value: V) -> Self {
        Outcome::Value(value)
    }

    /// Create a failed outcome with no aggregated errors.
    #[inline]
    pub fn fail(error: E) -> Self {
        Outcome::Error {
            error,
            aggregated: Vec::new(),
        }
    }

    /// Create a failed outcome with aggregated errors.
    #[inline]
    pub fn fail_with(error: E, aggregated: Vec<E>) -> Self {
        Outcome::Error { error, aggregated }
    }

    /// Create an outcome from a `Result`.
    #[inline]
    pub fn from_result(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(error) => Outcome::fail(error),
        }
    }

    /// Returns true if this outcome holds a value.
    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// Returns true if this outcome holds an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    /// Borrow the value.
    ///
    /// # Panics
    ///
    /// Panics if the outcome holds an error.
    #[inline]
    #[track_caller]
    pub fn value(&self) -> &V {
        match self {
            Outcome::Value(value) => value,
            Outcome::Error { .. } => panic!("Outcome holds an error, not a value"),
        }
    }

    /// Borrow the primary error.
    ///
    /// # Panics
    ///
    /// Panics if the outcome holds a value.
    #[inline]
    #[track_caller]
    pub fn error(&self) -> &E {
        match self {
            Outcome::Error { error, .. } => error,
            Outcome::Value(_) => panic!("Outcome holds a value, not an error"),
        }
    }

    /// Errors aggregated behind the primary one. Empty on the value side.
    #[inline]
    pub fn aggregated(&self) -> &[E] {
        match self {
            Outcome::Error { aggregated, .. } => aggregated,
            Outcome::Value(_) => &[],
        }
    }

    /// Iterate over every error, primary first.
    pub fn errors(&self) -> impl Iterator<Item = &E> {
        let (primary, rest) = match self {
            Outcome::Error { error, aggregated } => (Some(error), aggregated.as_slice()),
            Outcome::Value(_) => (None, &[][..]),
        };
        primary.into_iter().chain(rest.iter())
    }

    /// Take the value.
    ///
    /// # Panics
    ///
    /// Panics if the outcome holds an error.
    #[inline]
    #[track_caller]
    pub fn into_value(self) -> V {
        match self {
            Outcome::Value(value) => value,
            Outcome::Error { .. } => panic!("Outcome holds an error, not a value"),
        }
    }

    /// Take the primary error, dropping aggregated errors.
    ///
    /// # Panics
    ///
    /// Panics if the outcome holds a value.
    #[inline]
    #[track_caller]
    pub fn into_error(self) -> E {
        match self {
            Outcome::Error { error, .. } => error,
            Outcome::Value(_) => panic!("Outcome holds a value, not an error"),
        }
    }

    /// Take every error, primary first. Empty on the value side.
    pub fn into_errors(self) -> Vec<E> {
        match self {
            Outcome::Error { error, aggregated } => {
                let mut all = Vec::with_capacity(aggregated.len() + 1);
                all.push(error);
                all.extend(aggregated);
                all
            }
            Outcome::Value(_) => Vec::new(),
        }
    }

    /// Convert to a `Result`, keeping only the primary error.
    #[inline]
    pub fn into_result(self) -> Result<V, E> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Error { error, .. } => Err(error),
        }
    }

    /// Drop all error detail.
    #[inline]
    pub fn into_fallible(self) -> Fallible<V> {
        match self {
            Outcome::Value(value) => Fallible::Valid(value),
            Outcome::Error { .. } => Fallible::Invalid,
        }
    }

    /// Transform the value, passing errors through unchanged.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let o = Outcome::<_, &str>::ok(2).map(|x| x + 1);
    /// assert_eq!(o, Outcome::ok(3));
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(V) -> U,
    {
        match self {
            Outcome::Value(value) => Outcome::Value(f(value)),
            Outcome::Error { error, aggregated } => Outcome::Error { error, aggregated },
        }
    }

    /// Transform every error (primary and aggregated).
    pub fn map_err<E2, F>(self, mut f: F) -> Outcome<V, E2>
    where
        F: FnMut(E) -> E2,
    {
        match self {
            Outcome::Value(value) => Outcome::Value(value),
            Outcome::Error { error, aggregated } => Outcome::Error {
                error: f(error),
                aggregated: aggregated.into_iter().map(&mut f).collect(),
            },
        }
    }

    /// Chain a dependent computation on the value side.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(V) -> Outcome<U, E>,
    {
        match self {
            Outcome::Value(value) => f(value),
            Outcome::Error { error, aggregated } => Outcome::Error { error, aggregated },
        }
    }

    /// Invoke exactly one handler, selected by the tag.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let text = Outcome::<i32, &str>::fail("bad").fold(|v| v.to_string(), |e| e.to_uppercase());
    /// assert_eq!(text, "BAD");
    /// ```
    #[inline]
    pub fn fold<R, F, G>(self, on_value: F, on_error: G) -> R
    where
        F: FnOnce(V) -> R,
        G: FnOnce(E) -> R,
    {
        match self {
            Outcome::Value(value) => on_value(value),
            Outcome::Error { error, .. } => on_error(error),
        }
    }

    /// Like [`Outcome::fold`], but the error handler also receives the
    /// aggregated errors.
    #[inline]
    pub fn fold_aggregated<R, F, G>(self, on_value: F, on_error: G) -> R
    where
        F: FnOnce(V) -> R,
        G: FnOnce(E, Vec<E>) -> R,
    {
        match self {
            Outcome::Value(value) => on_value(value),
            Outcome::Error { error, aggregated } => on_error(error, aggregated),
        }
    }

    /// Combine with another outcome through [`bind`].
    #[inline]
    pub fn bind_with<B, C, F>(self, other: Outcome<B, E>, f: F) -> Outcome<C, E>
    where
        F: FnOnce(V, B) -> Outcome<C, E>,
    {
        bind(self, other, f)
    }

    /// Combine with another outcome using a function that cannot fail.
    #[inline]
    pub fn zip_with<B, C, F>(self, other: Outcome<B, E>, f: F) -> Outcome<C, E>
    where
        F: FnOnce(V, B) -> C,
    {
        zip_with(self, other, f)
    }

    /// Combine with another outcome into a pair.
    #[inline]
    pub fn zip<B>(self, other: Outcome<B, E>) -> Outcome<(V, B), E> {
        zip_with(self, other, |a, b| (a, b))
    }

    /// Combine every outcome of a tuple (up to eight elements).
    ///
    /// Equivalent to folding [`Outcome::zip`] from the left.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let all = Outcome::all((
    ///     Outcome::<_, &str>::ok(1),
    ///     Outcome::ok("two"),
    ///     Outcome::ok(3.0),
    /// ));
    /// assert_eq!(all, Outcome::ok((1, "two", 3.0)));
    /// ```
    pub fn all<T>(outcomes: T) -> Self
    where
        T: CombineAll<E, Output = V>,
    {
        outcomes.combine_all()
    }

    /// Emit a debug event when failed, then return the outcome unchanged.
    pub fn trace(self, label: &str) -> Self
    where
        E: std::fmt::Debug,
    {
        if let Outcome::Error { error, aggregated } = &self {
            tracing::debug!(
                label,
                error = ?error,
                aggregated = aggregated.len(),
                "outcome holds an error"
            );
        }
        self
    }

    /// Transform the value with an async function.
    ///
    /// The tag is inspected before anything is awaited; errors resolve
    /// immediately without calling `f`.
    pub fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U, E>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = U>,
    {
        match self {
            Outcome::Value(value) => Either::Left(f(value).map(Outcome::Value)),
            Outcome::Error { error, aggregated } => {
                Either::Right(futures_future::ready(Outcome::Error { error, aggregated }))
            }
        }
    }

    /// Chain a dependent async computation on the value side.
    pub fn and_then_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U, E>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = Outcome<U, E>>,
    {
        match self {
            Outcome::Value(value) => Either::Left(f(value)),
            Outcome::Error { error, aggregated } => {
                Either::Right(futures_future::ready(Outcome::Error { error, aggregated }))
            }
        }
    }

    /// Async counterpart of [`Outcome::fold`].
    pub fn fold_async<R, F, G, FutV, FutE>(
        self,
        on_value: F,
        on_error: G,
    ) -> impl Future<Output = R>
    where
        F: FnOnce(V) -> FutV,
        G: FnOnce(E) -> FutE,
        FutV: Future<Output = R>,
        FutE: Future<Output = R>,
    {
        match self {
            Outcome::Value(value) => Either::Left(on_value(value)),
            Outcome::Error { error, .. } => Either::Right(on_error(error)),
        }
    }

    /// Async counterpart of [`Outcome::fold_aggregated`].
    pub fn fold_aggregated_async<R, F, G, FutV, FutE>(
        self,
        on_value: F,
        on_error: G,
    ) -> impl Future<Output = R>
    where
        F: FnOnce(V) -> FutV,
        G: FnOnce(E, Vec<E>) -> FutE,
        FutV: Future<Output = R>,
        FutE: Future<Output = R>,
    {
        match self {
            Outcome::Value(value) => Either::Left(on_value(value)),
            Outcome::Error { error, aggregated } => Either::Right(on_error(error, aggregated)),
        }
    }
}

impl<V, E> Outcome<Vec<V>, E> {
    /// Combine any number of outcomes into an outcome of a `Vec`.
    ///
    /// Equivalent to folding [`Outcome::zip`] from the left, so the aggregation
    /// rules of [`bind`] apply pairwise.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let combined = Outcome::all_vec(vec![
    ///     Outcome::<i32, &str>::fail("a"),
    ///     Outcome::fail("b"),
    ///     Outcome::ok(3),
    /// ]);
    /// // The trailing success collapses the aggregate to the primary cause.
    /// assert_eq!(combined, Outcome::fail("a"));
    /// ```
    pub fn all_vec<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome<V, E>>,
    {
        bind::fold_all(outcomes)
    }
}

impl<V, E> FromIterator<Outcome<V, E>> for Outcome<Vec<V>, E> {
    fn from_iter<I: IntoIterator<Item = Outcome<V, E>>>(iter: I) -> Self {
        bind::fold_all(iter)
    }
}

impl<V, E> From<Result<V, E>> for Outcome<V, E> {
    fn from(result: Result<V, E>) -> Self {
        Outcome::from_result(result)
    }
}

impl<V, E> From<Outcome<V, E>> for Result<V, E> {
    fn from(outcome: Outcome<V, E>) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok() {
        let o = Outcome::<_, String>::ok(42);
        assert!(o.is_value());
        assert!(!o.is_error());
        assert_eq!(o.value(), &42);
        assert!(o.aggregated().is_empty());
    }

    #[test]
    fn test_fail() {
        let o = Outcome::<i32, _>::fail("boom");
        assert!(o.is_error());
        assert_eq!(o.error(), &"boom");
        assert!(o.aggregated().is_empty());
    }

    #[test]
    fn test_fail_with_aggregated() {
        let o = Outcome::<i32, _>::fail_with("a", vec!["b", "c"]);
        assert_eq!(o.error(), &"a");
        assert_eq!(o.aggregated(), &["b", "c"]);
        assert_eq!(o.errors().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(o.into_errors(), vec!["a", "b", "c"]);
    }

    #[test]
    #[should_panic(expected = "holds an error, not a value")]
    fn test_value_on_error_panics() {
        let o = Outcome::<i32, _>::fail("boom");
        let _ = o.value();
    }

    #[test]
    #[should_panic(expected = "holds a value, not an error")]
    fn test_error_on_value_panics() {
        let o = Outcome::<_, &str>::ok(1);
        let _ = o.error();
    }

    #[test]
    #[should_panic(expected = "holds a value, not an error")]
    fn test_into_error_on_value_panics() {
        Outcome::<_, &str>::ok(1).into_error();
    }

    #[test]
    fn test_result_conversions() {
        let o: Outcome<i32, &str> = Ok(1).into();
        assert_eq!(o, Outcome::ok(1));

        let o: Outcome<i32, &str> = Outcome::from_result(Err("e"));
        assert_eq!(o.clone().into_result(), Err("e"));
        let r: Result<i32, &str> = o.into();
        assert_eq!(r, Err("e"));
    }

    #[test]
    fn test_into_fallible() {
        assert_eq!(Outcome::<_, &str>::ok(1).into_fallible(), Fallible::Valid(1));
        assert_eq!(
            Outcome::<i32, _>::fail("e").into_fallible(),
            Fallible::Invalid
        );
    }

    #[test]
    fn test_map_passes_errors_through() {
        let o = Outcome::<i32, _>::fail_with("a", vec!["b"]).map(|x| x * 2);
        assert_eq!(o, Outcome::fail_with("a", vec!["b"]));
    }

    #[test]
    fn test_map_err_maps_all_errors() {
        let o = Outcome::<i32, _>::fail_with("a", vec!["bb", "ccc"]).map_err(str::len);
        assert_eq!(o, Outcome::fail_with(1, vec![2, 3]));
    }

    #[test]
    fn test_and_then() {
        let o = Outcome::<_, &str>::ok(2).and_then(|x| {
            if x > 1 {
                Outcome::fail("too big")
            } else {
                Outcome::ok(x)
            }
        });
        assert_eq!(o, Outcome::fail("too big"));
    }

    #[test]
    fn test_fold_calls_exactly_one_handler() {
        let mut value_calls = 0;
        let mut error_calls = 0;
        Outcome::<i32, &str>::fail("e").fold(|_| value_calls += 1, |_| error_calls += 1);
        assert_eq!((value_calls, error_calls), (0, 1));
    }

    #[test]
    fn test_fold_aggregated_receives_all_errors() {
        let collected = Outcome::<i32, _>::fail_with("a", vec!["b", "c"]).fold_aggregated(
            |_| Vec::new(),
            |e, mut rest| {
                rest.insert(0, e);
                rest
            },
        );
        assert_eq!(collected, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_error_type_is_boxed() {
        let o: Outcome<i32> = Outcome::fail("io failure".into());
        assert_eq!(o.error().to_string(), "io failure");
    }

    #[tokio::test]
    async fn test_map_async_skips_errors() {
        let mut called = false;
        let o = Outcome::<i32, _>::fail("e")
            .map_async(|x| {
                called = true;
                async move { x + 1 }
            })
            .await;
        assert_eq!(o, Outcome::fail("e"));
        assert!(!called);
    }

    #[tokio::test]
    async fn test_and_then_async() {
        let o = Outcome::<_, &str>::ok(1)
            .and_then_async(|x| async move { Outcome::ok(x + 1) })
            .await;
        assert_eq!(o, Outcome::ok(2));
    }

    #[tokio::test]
    async fn test_fold_async() {
        let n = Outcome::<i32, &str>::fail("four")
            .fold_async(|v| async move { v as usize }, |e| async move { e.len() })
            .await;
        assert_eq!(n, 4);
    }

    #[tokio::test]
    async fn test_fold_aggregated_async() {
        let n = Outcome::<i32, &str>::fail_with("a", vec!["b", "c"])
            .fold_aggregated_async(|_| async { 0 }, |_, rest| async move { rest.len() })
            .await;
        assert_eq!(n, 2);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_trace_logs_errors() {
        let o = Outcome::<i32, _>::fail("db down").trace("load_user");
        assert!(o.is_error());
        assert!(logs_contain("outcome holds an error"));
        assert!(logs_contain("load_user"));
    }
}

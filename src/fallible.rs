//! Valid/invalid container with no error detail
//!
//! `Fallible<T>` is the smallest "did this work" primitive in the crate. It either
//! holds a payload (`Valid`) or nothing at all (`Invalid`). Unlike [`Outcome`], it
//! carries no information about *why* a computation failed; use it where the
//! failure has already been reported elsewhere (for example through a
//! [`SafeCall`](crate::safe::SafeCall) logger) or where the reason does not matter.
//!
//! # Examples
//!
//! ```
//! use sluice::Fallible;
//!
//! fn parse_port(s: &str) -> Fallible<u16> {
//!     Fallible::from_result(s.parse::<u16>())
//! }
//!
//! assert_eq!(parse_port("8080"), Fallible::Valid(8080));
//! assert!(parse_port("eighty").is_invalid());
//!
//! // Validity is the only discriminant; combinators short-circuit on it.
//! let both = parse_port("80").zip(parse_port("443"));
//! assert_eq!(both.into_value(), (80, 443));
//! ```

use std::future::Future;

use futures::future::{self, Either, FutureExt};

use crate::outcome::Outcome;

/// A value that either holds a payload or is invalid.
///
/// Reading the payload of an `Invalid` container through [`Fallible::value`] or
/// [`Fallible::into_value`] is a programming error and panics. Use pattern
/// matching or the non-panicking accessors ([`Fallible::as_option`],
/// [`Fallible::value_or`]) when validity is not already known.
///
/// # Examples
///
/// ```
/// use sluice::Fallible;
///
/// let hit = Fallible::valid("cached");
/// let miss = Fallible::<&str>::invalid();
///
/// match hit {
///     Fallible::Valid(v) => assert_eq!(v, "cached"),
///     Fallible::Invalid => unreachable!(),
/// }
/// assert_eq!(miss.value_or("fresh"), "fresh");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fallible<T> {
    /// The computation produced a payload
    Valid(T),
    /// The computation produced nothing
    Invalid,
}

/// A payload-less [`Fallible`], used for actions that either completed or did not.
pub type Status = Fallible<()>;

impl Status {
    /// A completed action.
    ///
    /// ```
    /// use sluice::Status;
    ///
    /// assert!(Status::done().is_valid());
    /// ```
    #[inline]
    pub fn done() -> Self {
        Fallible::Valid(())
    }
}

impl<T> Fallible<T> {
    /// Create a valid container holding `value`.
    #[inline]
    pub fn valid(value: T) -> Self {
        Fallible::Valid(value)
    }

    /// Create an invalid container.
    #[inline]
    pub fn invalid() -> Self {
        Fallible::Invalid
    }

    /// Build a container from a `Result`, discarding the error.
    ///
    /// ```
    /// use sluice::Fallible;
    ///
    /// assert_eq!(Fallible::from_result(Ok::<_, ()>(1)), Fallible::Valid(1));
    /// assert_eq!(Fallible::<i32>::from_result(Err("nope")), Fallible::Invalid);
    /// ```
    #[inline]
    pub fn from_result<E>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Fallible::Valid(value),
            Err(_) => Fallible::Invalid,
        }
    }

    /// Returns true if the container holds a payload.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Fallible::Valid(_))
    }

    /// Returns true if the container holds nothing.
    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Fallible::Invalid)
    }

    /// Borrow the payload.
    ///
    /// # Panics
    ///
    /// Panics if the container is `Invalid`.
    #[inline]
    #[track_caller]
    pub fn value(&self) -> &T {
        match self {
            Fallible::Valid(value) => value,
            Fallible::Invalid => panic!("Fallible is not in a valid state"),
        }
    }

    /// Take the payload.
    ///
    /// # Panics
    ///
    /// Panics if the container is `Invalid`.
    #[inline]
    #[track_caller]
    pub fn into_value(self) -> T {
        match self {
            Fallible::Valid(value) => value,
            Fallible::Invalid => panic!("Fallible is not in a valid state"),
        }
    }

    /// Borrow the payload if present.
    #[inline]
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Fallible::Valid(value) => Some(value),
            Fallible::Invalid => None,
        }
    }

    /// Take the payload if present.
    #[inline]
    pub fn into_option(self) -> Option<T> {
        match self {
            Fallible::Valid(value) => Some(value),
            Fallible::Invalid => None,
        }
    }

    /// Convert to a container of references.
    #[inline]
    pub fn as_ref(&self) -> Fallible<&T> {
        match self {
            Fallible::Valid(value) => Fallible::Valid(value),
            Fallible::Invalid => Fallible::Invalid,
        }
    }

    /// Take the payload or fall back to `default`.
    #[inline]
    pub fn value_or(self, default: T) -> T {
        match self {
            Fallible::Valid(value) => value,
            Fallible::Invalid => default,
        }
    }

    /// Take the payload or compute a fallback.
    #[inline]
    pub fn value_or_else<F>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Fallible::Valid(value) => value,
            Fallible::Invalid => f(),
        }
    }

    /// Convert to a `Result`, using `error` for the invalid case.
    #[inline]
    pub fn ok_or<E>(self, error: E) -> Result<T, E> {
        match self {
            Fallible::Valid(value) => Ok(value),
            Fallible::Invalid => Err(error),
        }
    }

    /// Transform the payload if present.
    ///
    /// ```
    /// use sluice::Fallible;
    ///
    /// assert_eq!(Fallible::valid(5).map(|x| x * 2), Fallible::Valid(10));
    /// assert_eq!(Fallible::<i32>::invalid().map(|x| x * 2), Fallible::Invalid);
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Fallible<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Fallible::Valid(value) => Fallible::Valid(f(value)),
            Fallible::Invalid => Fallible::Invalid,
        }
    }

    /// Chain a dependent fallible computation.
    ///
    /// `f` is only called when this container is valid.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Fallible<U>
    where
        F: FnOnce(T) -> Fallible<U>,
    {
        match self {
            Fallible::Valid(value) => f(value),
            Fallible::Invalid => Fallible::Invalid,
        }
    }

    /// Fall back to another computation when invalid.
    #[inline]
    pub fn or_else<F>(self, f: F) -> Fallible<T>
    where
        F: FnOnce() -> Fallible<T>,
    {
        match self {
            Fallible::Valid(value) => Fallible::Valid(value),
            Fallible::Invalid => f(),
        }
    }

    /// Combine two containers into a container of a pair.
    ///
    /// Valid only when both sides are valid.
    #[inline]
    pub fn zip<U>(self, other: Fallible<U>) -> Fallible<(T, U)> {
        self.zip_with(other, |a, b| (a, b))
    }

    /// Combine two containers with a function.
    ///
    /// `f` is invoked at most once, and only when both sides are valid.
    #[inline]
    pub fn zip_with<U, R, F>(self, other: Fallible<U>, f: F) -> Fallible<R>
    where
        F: FnOnce(T, U) -> R,
    {
        match (self, other) {
            (Fallible::Valid(a), Fallible::Valid(b)) => Fallible::Valid(f(a, b)),
            _ => Fallible::Invalid,
        }
    }

    /// Invoke exactly one of the two handlers, selected by validity.
    ///
    /// ```
    /// use sluice::Fallible;
    ///
    /// let msg = Fallible::valid(3).fold(|n| format!("got {}", n), || "nothing".to_string());
    /// assert_eq!(msg, "got 3");
    /// ```
    #[inline]
    pub fn fold<R, F, G>(self, on_valid: F, on_invalid: G) -> R
    where
        F: FnOnce(T) -> R,
        G: FnOnce() -> R,
    {
        match self {
            Fallible::Valid(value) => on_valid(value),
            Fallible::Invalid => on_invalid(),
        }
    }

    /// Lift into an [`Outcome`], supplying the error for the invalid case.
    #[inline]
    pub fn into_outcome<E>(self, error: E) -> Outcome<T, E> {
        match self {
            Fallible::Valid(value) => Outcome::ok(value),
            Fallible::Invalid => Outcome::fail(error),
        }
    }

    /// Lift into an [`Outcome`], computing the error lazily.
    #[inline]
    pub fn into_outcome_with<E, F>(self, f: F) -> Outcome<T, E>
    where
        F: FnOnce() -> E,
    {
        match self {
            Fallible::Valid(value) => Outcome::ok(value),
            Fallible::Invalid => Outcome::fail(f()),
        }
    }

    /// Emit a debug event when invalid, then return the container unchanged.
    pub fn trace(self, label: &str) -> Self {
        if self.is_invalid() {
            tracing::debug!(label, "fallible value is invalid");
        }
        self
    }

    /// Transform the payload with an async function.
    ///
    /// The branch is chosen before anything is awaited; an invalid container
    /// resolves immediately without calling `f`.
    pub fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Fallible<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        match self {
            Fallible::Valid(value) => Either::Left(f(value).map(Fallible::Valid)),
            Fallible::Invalid => Either::Right(future::ready(Fallible::Invalid)),
        }
    }

    /// Chain a dependent async fallible computation.
    pub fn and_then_async<U, F, Fut>(self, f: F) -> impl Future<Output = Fallible<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Fallible<U>>,
    {
        match self {
            Fallible::Valid(value) => Either::Left(f(value)),
            Fallible::Invalid => Either::Right(future::ready(Fallible::Invalid)),
        }
    }

    /// Async counterpart of [`Fallible::fold`].
    pub fn fold_async<R, F, G, FutV, FutI>(
        self,
        on_valid: F,
        on_invalid: G,
    ) -> impl Future<Output = R>
    where
        F: FnOnce(T) -> FutV,
        G: FnOnce() -> FutI,
        FutV: Future<Output = R>,
        FutI: Future<Output = R>,
    {
        match self {
            Fallible::Valid(value) => Either::Left(on_valid(value)),
            Fallible::Invalid => Either::Right(on_invalid()),
        }
    }
}

impl<T> Default for Fallible<T> {
    fn default() -> Self {
        Fallible::Invalid
    }
}

impl<T> From<Option<T>> for Fallible<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Fallible::Valid(value),
            None => Fallible::Invalid,
        }
    }
}

impl<T> From<Fallible<T>> for Option<T> {
    fn from(fallible: Fallible<T>) -> Self {
        fallible.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_holds_value() {
        let f = Fallible::valid(42);
        assert!(f.is_valid());
        assert!(!f.is_invalid());
        assert_eq!(f.value(), &42);
        assert_eq!(f.into_value(), 42);
    }

    #[test]
    fn test_invalid_has_no_value() {
        let f = Fallible::<i32>::invalid();
        assert!(f.is_invalid());
        assert_eq!(f.as_option(), None);
    }

    #[test]
    #[should_panic(expected = "not in a valid state")]
    fn test_value_on_invalid_panics() {
        let f = Fallible::<i32>::invalid();
        let _ = f.value();
    }

    #[test]
    #[should_panic(expected = "not in a valid state")]
    fn test_into_value_on_invalid_panics() {
        Fallible::<String>::invalid().into_value();
    }

    #[test]
    fn test_status_done() {
        assert_eq!(Status::done(), Fallible::Valid(()));
        assert!(Status::invalid().is_invalid());
    }

    #[test]
    fn test_default_is_invalid() {
        assert_eq!(Fallible::<u8>::default(), Fallible::Invalid);
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(Fallible::from(Some(1)), Fallible::Valid(1));
        assert_eq!(Fallible::<i32>::from(None), Fallible::Invalid);
        assert_eq!(Option::from(Fallible::valid("x")), Some("x"));
    }

    #[test]
    fn test_from_result_discards_error() {
        assert_eq!(Fallible::from_result("7".parse::<i32>()), Fallible::Valid(7));
        assert_eq!(Fallible::from_result("x".parse::<i32>()), Fallible::Invalid);
    }

    #[test]
    fn test_value_or() {
        assert_eq!(Fallible::valid(1).value_or(9), 1);
        assert_eq!(Fallible::invalid().value_or(9), 9);
        assert_eq!(Fallible::<i32>::invalid().value_or_else(|| 3), 3);
    }

    #[test]
    fn test_ok_or() {
        assert_eq!(Fallible::valid(1).ok_or("missing"), Ok(1));
        assert_eq!(Fallible::<i32>::invalid().ok_or("missing"), Err("missing"));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let mut called = false;
        let result = Fallible::<i32>::invalid().and_then(|x| {
            called = true;
            Fallible::valid(x + 1)
        });
        assert_eq!(result, Fallible::Invalid);
        assert!(!called);

        assert_eq!(
            Fallible::valid(1).and_then(|x| Fallible::valid(x + 1)),
            Fallible::Valid(2)
        );
    }

    #[test]
    fn test_or_else() {
        assert_eq!(
            Fallible::invalid().or_else(|| Fallible::valid(5)),
            Fallible::Valid(5)
        );
        assert_eq!(
            Fallible::valid(1).or_else(|| Fallible::valid(5)),
            Fallible::Valid(1)
        );
    }

    #[test]
    fn test_zip_requires_both() {
        assert_eq!(
            Fallible::valid(1).zip(Fallible::valid("a")),
            Fallible::Valid((1, "a"))
        );
        assert_eq!(
            Fallible::valid(1).zip(Fallible::<&str>::invalid()),
            Fallible::Invalid
        );
        assert_eq!(
            Fallible::<i32>::invalid().zip(Fallible::valid("a")),
            Fallible::Invalid
        );
    }

    #[test]
    fn test_zip_with_not_called_on_invalid() {
        let mut calls = 0;
        let result = Fallible::valid(1).zip_with(Fallible::<i32>::invalid(), |a, b| {
            calls += 1;
            a + b
        });
        assert_eq!(result, Fallible::Invalid);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_fold_selects_one_handler() {
        assert_eq!(Fallible::valid(2).fold(|x| x * 10, || -1), 20);
        assert_eq!(Fallible::<i32>::invalid().fold(|x| x * 10, || -1), -1);
    }

    #[test]
    fn test_into_outcome() {
        let outcome = Fallible::valid(1).into_outcome("unused");
        assert_eq!(outcome, Outcome::ok(1));

        let outcome = Fallible::<i32>::invalid().into_outcome_with(|| "no value");
        assert_eq!(outcome, Outcome::fail("no value"));
    }

    #[tokio::test]
    async fn test_map_async() {
        let result = Fallible::valid(2).map_async(|x| async move { x * 3 }).await;
        assert_eq!(result, Fallible::Valid(6));

        let result = Fallible::<i32>::invalid()
            .map_async(|x| async move { x * 3 })
            .await;
        assert_eq!(result, Fallible::Invalid);
    }

    #[tokio::test]
    async fn test_and_then_async() {
        let result = Fallible::valid(2)
            .and_then_async(|x| async move {
                if x > 1 {
                    Fallible::valid(x)
                } else {
                    Fallible::invalid()
                }
            })
            .await;
        assert_eq!(result, Fallible::Valid(2));
    }

    #[tokio::test]
    async fn test_fold_async() {
        let text = Fallible::<i32>::invalid()
            .fold_async(
                |x| async move { x.to_string() },
                || async { "none".to_string() },
            )
            .await;
        assert_eq!(text, "none");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Fallible::valid(5)).unwrap();
        let back: Fallible<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Fallible::Valid(5));
    }
}

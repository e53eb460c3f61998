//! Two-operand combinators and error aggregation.
//!
//! All combinators in this module share one rule set:
//!
//! | first        | second       | result                                                 |
//! |--------------|--------------|--------------------------------------------------------|
//! | `Value(a)`   | `Value(b)`   | `f(a, b)`                                              |
//! | `Error(e1)`  | `Error(e2)`  | `Error(e1)`, aggregated = `agg1 ++ [e2] ++ agg2`       |
//! | `Error(e1)`  | `Value(_)`   | `Error(e1)`, no aggregated errors                      |
//! | `Value(_)`   | `Error(e2)`  | `Error(e2)`, no aggregated errors                      |
//!
//! Aggregation only happens when both sides failed: it exists so that a second,
//! simultaneous cause is not lost when only one error fits the primary slot.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use super::Outcome;

/// Combine two independently produced outcomes.
///
/// `f` runs exactly once when both sides hold values and never otherwise.
///
/// # Examples
///
/// ```
/// use sluice::outcome::{bind, Outcome};
///
/// let a = Outcome::<i32, &str>::fail_with("e1", vec!["a1"]);
/// let b = Outcome::<i32, &str>::fail_with("e2", vec!["b1"]);
///
/// let c = bind(a, b, |x, y| Outcome::ok(x + y));
/// assert_eq!(c, Outcome::fail_with("e1", vec!["a1", "e2", "b1"]));
/// ```
pub fn bind<A, B, C, E, F>(first: Outcome<A, E>, second: Outcome<B, E>, f: F) -> Outcome<C, E>
where
    F: FnOnce(A, B) -> Outcome<C, E>,
{
    match (first, second) {
        (Outcome::Value(a), Outcome::Value(b)) => f(a, b),
        (
            Outcome::Error {
                error,
                mut aggregated,
            },
            Outcome::Error {
                error: second_error,
                aggregated: second_aggregated,
            },
        ) => {
            aggregated.reserve(second_aggregated.len() + 1);
            aggregated.push(second_error);
            aggregated.extend(second_aggregated);
            Outcome::Error { error, aggregated }
        }
        (Outcome::Error { error, .. }, Outcome::Value(_)) => Outcome::fail(error),
        (Outcome::Value(_), Outcome::Error { error, .. }) => Outcome::fail(error),
    }
}

/// Combine two outcomes with a function that cannot fail.
pub fn zip_with<A, B, C, E, F>(first: Outcome<A, E>, second: Outcome<B, E>, f: F) -> Outcome<C, E>
where
    F: FnOnce(A, B) -> C,
{
    bind(first, second, |a, b| Outcome::Value(f(a, b)))
}

/// Combine two outcomes whose error types differ by converting the second
/// outcome's errors (primary and aggregated) into the first outcome's type.
///
/// # Examples
///
/// ```
/// use sluice::outcome::{bind_convert, Outcome};
///
/// let a = Outcome::<i32, String>::fail("parse".to_string());
/// let b = Outcome::<i32, u16>::fail(404);
///
/// let c = bind_convert(a, b, |code| format!("http {}", code), |x, y| Outcome::ok(x + y));
/// assert_eq!(c, Outcome::fail_with("parse".to_string(), vec!["http 404".to_string()]));
/// ```
pub fn bind_convert<A, B, C, E1, E2, G, F>(
    first: Outcome<A, E1>,
    second: Outcome<B, E2>,
    convert: G,
    f: F,
) -> Outcome<C, E1>
where
    G: FnMut(E2) -> E1,
    F: FnOnce(A, B) -> Outcome<C, E1>,
{
    bind(first, second.map_err(convert), f)
}

/// Combine two outcomes whose error types differ by pairing the error types.
///
/// When both sides fail, the primary error is [`ErrorPair::Both`] and the
/// aggregated errors of each side follow as [`ErrorPair::First`] and
/// [`ErrorPair::Second`] entries, first side first.
///
/// # Examples
///
/// ```
/// use sluice::outcome::{bind_pair, ErrorPair, Outcome};
///
/// let a = Outcome::<i32, &str>::fail("bad name");
/// let b = Outcome::<i32, u16>::ok(2);
///
/// let c = bind_pair(a, b, |x, y| Outcome::ok(x + y));
/// assert_eq!(c, Outcome::fail(ErrorPair::First("bad name")));
/// ```
pub fn bind_pair<A, B, C, E1, E2, F>(
    first: Outcome<A, E1>,
    second: Outcome<B, E2>,
    f: F,
) -> Outcome<C, ErrorPair<E1, E2>>
where
    F: FnOnce(A, B) -> Outcome<C, ErrorPair<E1, E2>>,
{
    match (first, second) {
        (Outcome::Value(a), Outcome::Value(b)) => f(a, b),
        (
            Outcome::Error {
                error: first_error,
                aggregated: first_aggregated,
            },
            Outcome::Error {
                error: second_error,
                aggregated: second_aggregated,
            },
        ) => {
            let aggregated = first_aggregated
                .into_iter()
                .map(ErrorPair::First)
                .chain(second_aggregated.into_iter().map(ErrorPair::Second))
                .collect();
            Outcome::Error {
                error: ErrorPair::Both(first_error, second_error),
                aggregated,
            }
        }
        (Outcome::Error { error, .. }, Outcome::Value(_)) => Outcome::fail(ErrorPair::First(error)),
        (Outcome::Value(_), Outcome::Error { error, .. }) => {
            Outcome::fail(ErrorPair::Second(error))
        }
    }
}

/// Await two outcome futures left to right, then combine them with an async
/// function.
///
/// Both operands are always awaited so that a double failure can be
/// aggregated; `f` is only awaited when both hold values.
pub async fn bind_async<A, B, C, E, FA, FB, F, Fut>(first: FA, second: FB, f: F) -> Outcome<C, E>
where
    FA: Future<Output = Outcome<A, E>>,
    FB: Future<Output = Outcome<B, E>>,
    F: FnOnce(A, B) -> Fut,
    Fut: Future<Output = Outcome<C, E>>,
{
    let first = first.await;
    let second = second.await;
    match (first, second) {
        (Outcome::Value(a), Outcome::Value(b)) => f(a, b).await,
        (first, second) => bind(first, second, |_, _| unreachable!("both sides hold values")),
    }
}

/// Error type produced by [`bind_pair`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorPair<E1, E2> {
    /// Only the first operand failed
    First(E1),
    /// Only the second operand failed
    Second(E2),
    /// Both operands failed
    Both(E1, E2),
}

impl<E1, E2> ErrorPair<E1, E2> {
    /// The first operand's error, if it failed.
    pub fn first(&self) -> Option<&E1> {
        match self {
            ErrorPair::First(e) | ErrorPair::Both(e, _) => Some(e),
            ErrorPair::Second(_) => None,
        }
    }

    /// The second operand's error, if it failed.
    pub fn second(&self) -> Option<&E2> {
        match self {
            ErrorPair::Second(e) | ErrorPair::Both(_, e) => Some(e),
            ErrorPair::First(_) => None,
        }
    }

    /// Split into the optional errors of each side.
    pub fn into_parts(self) -> (Option<E1>, Option<E2>) {
        match self {
            ErrorPair::First(e1) => (Some(e1), None),
            ErrorPair::Second(e2) => (None, Some(e2)),
            ErrorPair::Both(e1, e2) => (Some(e1), Some(e2)),
        }
    }
}

impl<E1: fmt::Display, E2: fmt::Display> fmt::Display for ErrorPair<E1, E2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPair::First(e) => write!(f, "{}", e),
            ErrorPair::Second(e) => write!(f, "{}", e),
            ErrorPair::Both(e1, e2) => write!(f, "{}; {}", e1, e2),
        }
    }
}

impl<E1, E2> StdError for ErrorPair<E1, E2>
where
    E1: StdError + 'static,
    E2: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ErrorPair::First(e) | ErrorPair::Both(e, _) => Some(e),
            ErrorPair::Second(e) => Some(e),
        }
    }
}

/// Trait for combining a tuple of outcomes that share an error type.
///
/// Implemented for tuples of one to eight outcomes. The result is the same as
/// folding [`Outcome::zip`] from the left.
pub trait CombineAll<E> {
    /// Tuple of the combined values
    type Output;

    /// Combine every outcome, aggregating errors pairwise from the left
    fn combine_all(self) -> Outcome<Self::Output, E>;
}

type Failure<E> = (E, Vec<E>);

// Start a left fold with the first operand, keeping its aggregated errors.
fn seed<V, E>(failure: &mut Option<Failure<E>>, first: Outcome<V, E>) -> Option<V> {
    match first {
        Outcome::Value(value) => Some(value),
        Outcome::Error { error, aggregated } => {
            *failure = Some((error, aggregated));
            None
        }
    }
}

// One step of the left fold: the folded prefix combined with the next operand.
fn absorb<V, E>(failure: &mut Option<Failure<E>>, next: Outcome<V, E>) -> Option<V> {
    match (failure.take(), next) {
        (None, Outcome::Value(value)) => Some(value),
        (None, Outcome::Error { error, .. }) => {
            *failure = Some((error, Vec::new()));
            None
        }
        (Some((error, _)), Outcome::Value(_)) => {
            *failure = Some((error, Vec::new()));
            None
        }
        (
            Some((error, mut aggregated)),
            Outcome::Error {
                error: next_error,
                aggregated: next_aggregated,
            },
        ) => {
            aggregated.push(next_error);
            aggregated.extend(next_aggregated);
            *failure = Some((error, aggregated));
            None
        }
    }
}

pub(super) fn fold_all<V, E, I>(outcomes: I) -> Outcome<Vec<V>, E>
where
    I: IntoIterator<Item = Outcome<V, E>>,
{
    let mut iter = outcomes.into_iter();
    let mut failure = None;
    let mut values = Vec::new();

    if let Some(first) = iter.next() {
        values.extend(seed(&mut failure, first));
    }
    for next in iter {
        values.extend(absorb(&mut failure, next));
    }

    match failure {
        Some((error, aggregated)) => Outcome::Error { error, aggregated },
        None => Outcome::Value(values),
    }
}

macro_rules! impl_combine_all {
    ($first_ty:ident $first:ident $(, $ty:ident $var:ident)*) => {
        impl<E, $first_ty $(, $ty)*> CombineAll<E>
            for (Outcome<$first_ty, E>, $(Outcome<$ty, E>,)*)
        {
            type Output = ($first_ty, $($ty,)*);

            fn combine_all(self) -> Outcome<Self::Output, E> {
                let ($first, $($var,)*) = self;
                let mut failure = None;
                let $first = seed(&mut failure, $first);
                $(let $var = absorb(&mut failure, $var);)*

                if let Some((error, aggregated)) = failure {
                    return Outcome::Error { error, aggregated };
                }
                match ($first, $($var,)*) {
                    (Some($first), $(Some($var),)*) => Outcome::Value(($first, $($var,)*)),
                    _ => unreachable!("every operand holds a value when no failure was recorded"),
                }
            }
        }
    };
}

impl_combine_all!(T1 o1);
impl_combine_all!(T1 o1, T2 o2);
impl_combine_all!(T1 o1, T2 o2, T3 o3);
impl_combine_all!(T1 o1, T2 o2, T3 o3, T4 o4);
impl_combine_all!(T1 o1, T2 o2, T3 o3, T4 o4, T5 o5);
impl_combine_all!(T1 o1, T2 o2, T3 o3, T4 o4, T5 o5, T6 o6);
impl_combine_all!(T1 o1, T2 o2, T3 o3, T4 o4, T5 o5, T6 o6, T7 o7);
impl_combine_all!(T1 o1, T2 o2, T3 o3, T4 o4, T5 o5, T6 o6, T7 o7, T8 o8);

//! Testing utilities for code built on sluice containers
//!
//! Assertion macros with readable failure messages, and property-based testing
//! support behind the `proptest` feature.
//!
//! # Examples
//!
//! ```rust
//! use sluice::{assert_invalid, assert_outcome_error, assert_valid, Fallible, Outcome};
//!
//! assert_valid!(Fallible::valid(42));
//! assert_valid!(Fallible::valid(42), 42);
//! assert_invalid!(Fallible::<i32>::invalid());
//!
//! let both = Outcome::<i32, &str>::fail_with("first", vec!["second"]);
//! assert_outcome_error!(both, vec!["first", "second"]);
//! ```

/// Assert that a `Fallible` is valid, optionally checking its value.
///
/// # Example
///
/// ```rust
/// use sluice::{assert_valid, Fallible};
///
/// let parsed = Fallible::from_result("7".parse::<u8>());
/// assert_valid!(parsed, 7);
/// ```
#[macro_export]
macro_rules! assert_valid {
    ($fallible:expr) => {
        if let $crate::Fallible::Invalid = $fallible {
            panic!("Expected Valid, got Invalid");
        }
    };
    ($fallible:expr, $expected:expr) => {
        match $fallible {
            $crate::Fallible::Valid(value) => assert_eq!(value, $expected),
            $crate::Fallible::Invalid => {
                panic!("Expected Valid({:?}), got Invalid", $expected);
            }
        }
    };
}

/// Assert that a `Fallible` is invalid.
///
/// # Example
///
/// ```rust
/// use sluice::{assert_invalid, Fallible};
///
/// assert_invalid!(Fallible::from_result("x".parse::<u8>()));
/// ```
#[macro_export]
macro_rules! assert_invalid {
    ($fallible:expr) => {
        if let $crate::Fallible::Valid(v) = $fallible {
            panic!("Expected Invalid, got Valid: {:?}", v);
        }
    };
}

/// Assert that an `Outcome` holds an error, optionally checking every error
/// (primary first, then aggregated).
///
/// # Example
///
/// ```rust
/// use sluice::{assert_outcome_error, zip_with, Outcome};
///
/// let combined = zip_with(
///     Outcome::<i32, &str>::fail("left"),
///     Outcome::<i32, &str>::fail("right"),
///     |a, b| a + b,
/// );
/// assert_outcome_error!(combined, vec!["left", "right"]);
/// ```
#[macro_export]
macro_rules! assert_outcome_error {
    ($outcome:expr) => {
        if let $crate::Outcome::Value(v) = $outcome {
            panic!("Expected Error, got Value: {:?}", v);
        }
    };
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            outcome @ $crate::Outcome::Error { .. } => {
                assert_eq!(outcome.into_errors(), $expected);
            }
            $crate::Outcome::Value(v) => {
                panic!("Expected Error with {:?}, got Value: {:?}", $expected, v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
use crate::{Fallible, Outcome};

#[cfg(feature = "proptest")]
impl<T> Arbitrary for Fallible<T>
where
    T: Arbitrary + 'static,
{
    type Parameters = T::Parameters;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            3 => any_with::<T>(args).prop_map(Fallible::Valid),
            1 => Just(()).prop_map(|()| Fallible::Invalid),
        ]
        .boxed()
    }
}

/// Errors are generated with up to three aggregated errors.
#[cfg(feature = "proptest")]
impl<V, E> Arbitrary for Outcome<V, E>
where
    V: Arbitrary + 'static,
    E: Arbitrary + 'static,
{
    type Parameters = (V::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (v_params, e_params) = args;
        prop_oneof![
            any_with::<V>(v_params).prop_map(Outcome::ok),
            proptest::collection::vec(any_with::<E>(e_params), 1..5).prop_map(|mut errors| {
                let error = errors.remove(0);
                Outcome::fail_with(error, errors)
            }),
        ]
        .boxed()
    }
}

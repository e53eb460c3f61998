//! Extension traits for futures that resolve to containers.
//!
//! These cover the "async operand" half of the combinator matrix. Each method
//! awaits the operand first, then dispatches on the tag; the handler is only
//! awaited when it is itself async.

use std::future::Future;

use crate::fallible::Fallible;

use super::Outcome;

/// Combinators for futures resolving to an [`Outcome`].
///
/// # Examples
///
/// ```
/// use sluice::outcome::{Outcome, OutcomeFutureExt};
///
/// # tokio_test::block_on(async {
/// let fetch = async { Outcome::<u32, String>::ok(200) };
/// let status = fetch.map_value(|code| code == 200).await;
/// assert_eq!(status, Outcome::ok(true));
/// # });
/// ```
pub trait OutcomeFutureExt<V, E>: Future<Output = Outcome<V, E>> + Sized {
    /// Await, then invoke exactly one synchronous handler.
    fn fold_outcome<R, F, G>(self, on_value: F, on_error: G) -> impl Future<Output = R>
    where
        F: FnOnce(V) -> R,
        G: FnOnce(E) -> R,
    {
        async move { self.await.fold(on_value, on_error) }
    }

    /// Await, then invoke exactly one async handler.
    fn fold_outcome_async<R, F, G, FutV, FutE>(
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
        async move { self.await.fold_async(on_value, on_error).await }
    }

    /// Await, then invoke exactly one synchronous handler, passing the
    /// aggregated errors to the error handler.
    fn fold_outcome_aggregated<R, F, G>(self, on_value: F, on_error: G) -> impl Future<Output = R>
    where
        F: FnOnce(V) -> R,
        G: FnOnce(E, Vec<E>) -> R,
    {
        async move { self.await.fold_aggregated(on_value, on_error) }
    }

    /// Await, then invoke exactly one async handler, passing the aggregated
    /// errors to the error handler.
    fn fold_outcome_aggregated_async<R, F, G, FutV, FutE>(
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
        async move { self.await.fold_aggregated_async(on_value, on_error).await }
    }

    /// Await, then transform the value side.
    fn map_value<U, F>(self, f: F) -> impl Future<Output = Outcome<U, E>>
    where
        F: FnOnce(V) -> U,
    {
        async move { self.await.map(f) }
    }

    /// Await, then transform the value side with an async function.
    fn map_value_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U, E>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = U>,
    {
        async move { self.await.map_async(f).await }
    }

    /// Await, then chain a dependent async computation.
    fn and_then_outcome<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U, E>>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = Outcome<U, E>>,
    {
        async move { self.await.and_then_async(f).await }
    }
}

impl<V, E, T> OutcomeFutureExt<V, E> for T where T: Future<Output = Outcome<V, E>> {}

/// Combinators for futures resolving to a [`Fallible`].
pub trait FallibleFutureExt<T>: Future<Output = Fallible<T>> + Sized {
    /// Await, then invoke exactly one synchronous handler.
    fn fold_fallible<R, F, G>(self, on_valid: F, on_invalid: G) -> impl Future<Output = R>
    where
        F: FnOnce(T) -> R,
        G: FnOnce() -> R,
    {
        async move { self.await.fold(on_valid, on_invalid) }
    }

    /// Await, then invoke exactly one async handler.
    fn fold_fallible_async<R, F, G, FutV, FutI>(
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
        async move { self.await.fold_async(on_valid, on_invalid).await }
    }

    /// Await, then transform the payload.
    fn map_valid<U, F>(self, f: F) -> impl Future<Output = Fallible<U>>
    where
        F: FnOnce(T) -> U,
    {
        async move { self.await.map(f) }
    }

    /// Await, then transform the payload with an async function.
    fn map_valid_async<U, F, Fut>(self, f: F) -> impl Future<Output = Fallible<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        async move { self.await.map_async(f).await }
    }

    /// Await, then chain a dependent async computation.
    fn and_then_fallible<U, F, Fut>(self, f: F) -> impl Future<Output = Fallible<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Fallible<U>>,
    {
        async move { self.await.and_then_async(f).await }
    }
}

impl<T, Fut> FallibleFutureExt<T> for Fut where Fut: Future<Output = Fallible<T>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_fold_outcome_sync_handler() {
        let text = async { Outcome::<i32, &str>::fail("nope") }
            .fold_outcome(|v| v.to_string(), |e| e.to_string())
            .await;
        assert_eq!(text, "nope");
    }

    #[tokio::test]
    async fn test_fold_outcome_async_handler() {
        let n = async { Outcome::<i32, &str>::ok(4) }
            .fold_outcome_async(|v| async move { v * 2 }, |_| async { 0 })
            .await;
        assert_eq!(n, 8);
    }

    #[tokio::test]
    async fn test_fold_outcome_aggregated() {
        let count = async { Outcome::<i32, &str>::fail_with("a", vec!["b"]) }
            .fold_outcome_aggregated(|_| 0, |_, rest| rest.len() + 1)
            .await;
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_fold_outcome_aggregated_async() {
        let joined = async { Outcome::<i32, &str>::fail_with("a", vec!["b", "c"]) }
            .fold_outcome_aggregated_async(
                |v| async move { v.to_string() },
                |first, rest| async move {
                    let mut all = vec![first];
                    all.extend(rest);
                    all.join(",")
                },
            )
            .await;
        assert_eq!(joined, "a,b,c");

        let value = async { Outcome::<i32, &str>::ok(5) }
            .fold_outcome_aggregated_async(
                |v| async move { v.to_string() },
                |_, _| async { "error".to_string() },
            )
            .await;
        assert_eq!(value, "5");
    }

    #[tokio::test]
    async fn test_map_value_keeps_aggregated_errors() {
        let o = async { Outcome::<i32, &str>::fail_with("a", vec!["b"]) }
            .map_value(|v| v + 1)
            .await;
        assert_eq!(o, Outcome::fail_with("a", vec!["b"]));
    }

    #[tokio::test]
    async fn test_map_value_async() {
        let o = async { Outcome::<i32, &str>::ok(1) }
            .map_value_async(|v| async move { v + 1 })
            .await;
        assert_eq!(o, Outcome::ok(2));
    }

    #[tokio::test]
    async fn test_and_then_outcome_not_invoked_on_error() {
        let calls = AtomicU32::new(0);
        let o = async { Outcome::<i32, &str>::fail("e") }
            .and_then_outcome(|v| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Outcome::ok(v) }
            })
            .await;
        assert_eq!(o, Outcome::fail("e"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallible_future_ext() {
        let f = async { Fallible::valid(3) }.map_valid(|x| x * 3).await;
        assert_eq!(f, Fallible::Valid(9));

        let text = async { Fallible::<i32>::invalid() }
            .fold_fallible(|x| x.to_string(), || "invalid".to_string())
            .await;
        assert_eq!(text, "invalid");

        let n = async { Fallible::valid(2) }
            .fold_fallible_async(|x| async move { x }, || async { 0 })
            .await;
        assert_eq!(n, 2);

        let doubled = async { Fallible::valid(2) }
            .map_valid_async(|x| async move { x * 2 })
            .await;
        assert_eq!(doubled, Fallible::Valid(4));

        let skipped = async { Fallible::<i32>::invalid() }
            .map_valid_async(|x| async move { x + 100 })
            .await;
        assert_eq!(skipped, Fallible::<i32>::Invalid);

        let chained = async { Fallible::valid(2) }
            .and_then_fallible(|x| async move { Fallible::valid(x + 1) })
            .await;
        assert_eq!(chained, Fallible::Valid(3));
    }
}

//! Integration tests for once-only lazy evaluation under contention

use sluice::{LazyOnce, LazyOnceAsync};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_lazy_once_defers_until_first_read() {
    let runs = AtomicUsize::new(0);
    let lazy = LazyOnce::new(|| {
        runs.fetch_add(1, Ordering::SeqCst);
        vec!["a", "b"]
    });

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(lazy.get().len(), 2);
    assert_eq!(lazy.get().len(), 2);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_lazy_async_single_run_under_contention() {
    for _ in 0..20 {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let lazy = Arc::new(LazyOnceAsync::new(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            String::from("shared")
        }));

        let barrier = Arc::new(tokio::sync::Barrier::new(32));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let lazy = lazy.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    lazy.get().await.clone()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "shared");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_lazy_async_late_reader_joins_in_flight_computation() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let lazy = Arc::new(LazyOnceAsync::new(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        7u64
    }));

    let early = {
        let lazy = lazy.clone();
        tokio::spawn(async move { *lazy.get().await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!lazy.is_evaluated());

    let late = *lazy.get().await;
    assert_eq!(late, 7);
    assert_eq!(early.await.unwrap(), 7);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

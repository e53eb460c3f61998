//! Single-slot fault logger registry.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::Fault;

/// A fault logging function.
pub type Logger = Arc<dyn Fn(&Fault) + Send + Sync>;

/// Holds at most one fault logger.
///
/// Setting a logger replaces the previous one; there is no stacking. Safe calls
/// take a [`LoggerSnapshot`] of the registry when they are constructed, so later
/// replacements do not affect calls that already exist.
///
/// # Examples
///
/// ```
/// use sluice::safe::LoggerRegistry;
///
/// let registry = LoggerRegistry::new();
/// assert!(!registry.is_set());
///
/// registry.set(|fault| eprintln!("fault: {}", fault));
/// assert!(registry.is_set());
///
/// assert!(registry.remove());
/// assert!(!registry.is_set());
/// ```
#[derive(Default)]
pub struct LoggerRegistry {
    slot: RwLock<Option<Logger>>,
}

impl LoggerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a logger already installed.
    pub fn with_logger<F>(logger: F) -> Self
    where
        F: Fn(&Fault) + Send + Sync + 'static,
    {
        LoggerRegistry {
            slot: RwLock::new(Some(Arc::new(logger))),
        }
    }

    /// A process-wide registry, for hosts that want a single shared slot.
    ///
    /// Nothing in this crate reads it implicitly; pass it to constructors like
    /// any other registry.
    pub fn global() -> &'static LoggerRegistry {
        static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();
        GLOBAL.get_or_init(LoggerRegistry::new)
    }

    /// Install a logger, replacing any previous one.
    pub fn set<F>(&self, logger: F)
    where
        F: Fn(&Fault) + Send + Sync + 'static,
    {
        self.set_shared(Arc::new(logger));
    }

    /// Install an already shared logger, replacing any previous one.
    pub fn set_shared(&self, logger: Logger) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(logger);
    }

    /// Remove the current logger. Returns true if one was installed.
    pub fn remove(&self) -> bool {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Returns true if a logger is installed.
    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Capture the current logger.
    pub fn snapshot(&self) -> LoggerSnapshot {
        LoggerSnapshot(
            self.slot
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// The logger captured from a [`LoggerRegistry`] at one point in time.
#[derive(Clone, Default)]
pub struct LoggerSnapshot(Option<Logger>);

impl LoggerSnapshot {
    /// A snapshot with no logger.
    pub fn none() -> Self {
        LoggerSnapshot(None)
    }

    /// A snapshot of a specific logger, bypassing any registry.
    pub fn of<F>(logger: F) -> Self
    where
        F: Fn(&Fault) + Send + Sync + 'static,
    {
        LoggerSnapshot(Some(Arc::new(logger)))
    }

    /// Returns true if a logger was captured.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Report a fault to the captured logger.
    ///
    /// Best effort: if the logger panics, the panic is swallowed.
    pub fn log(&self, fault: &Fault) {
        let Some(logger) = &self.0 else {
            tracing::trace!(%fault, "no fault logger captured");
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| logger(fault))).is_err() {
            tracing::warn!(%fault, "fault logger panicked, ignoring");
        }
    }
}

/// Report a fault to a snapshot's logger. Equivalent to [`LoggerSnapshot::log`].
pub fn log_fault(logger: &LoggerSnapshot, fault: &Fault) {
    logger.log(fault);
}

impl fmt::Debug for LoggerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerSnapshot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_set_replaces_logger() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let registry = LoggerRegistry::new();

        let counter = first.clone();
        registry.set(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = second.clone();
        registry.set(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.snapshot().log(&Fault::from_error("x"));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_is_immune_to_later_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = LoggerRegistry::with_logger(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let snapshot = registry.snapshot();
        assert!(registry.remove());
        assert!(!registry.remove());

        snapshot.log(&Fault::from_error("still logged"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!registry.snapshot().is_set());
    }

    #[test]
    fn test_log_fault_reaches_logger() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let snapshot = LoggerSnapshot::of(move |fault| {
            assert!(fault.is_panic());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        log_fault(&snapshot, &Fault::from_panic(Box::new("boom")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_none_is_silent() {
        LoggerSnapshot::none().log(&Fault::from_panic(Box::new("ignored")));
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_panicking_logger_is_swallowed() {
        let snapshot = LoggerSnapshot::of(|_| panic!("logger broke"));
        snapshot.log(&Fault::from_error("original"));
        assert!(logs_contain("fault logger panicked"));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(LoggerRegistry::global(), LoggerRegistry::global()));
    }

    #[test]
    fn test_debug_output() {
        let registry = LoggerRegistry::new();
        assert_eq!(format!("{:?}", registry), "LoggerRegistry { is_set: false }");
        assert_eq!(
            format!("{:?}", LoggerSnapshot::of(|_| {})),
            "LoggerSnapshot { is_set: true }"
        );
    }
}

//! The failure captured by a safe call.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use crate::outcome::BoxError;

/// A failure raised by host code inside a [`SafeCall`](super::SafeCall).
///
/// Either the producer returned an error, or it panicked. The fault is handed to
/// the logger by reference, exactly as captured.
///
/// # Examples
///
/// ```
/// use sluice::safe::Fault;
///
/// let fault = Fault::from_error("disk full");
/// assert!(!fault.is_panic());
/// assert_eq!(fault.to_string(), "disk full");
/// ```
#[derive(Debug)]
pub enum Fault {
    /// The producer returned an error
    Error(BoxError),
    /// The producer panicked
    Panic {
        /// The panic message, or a placeholder for non-string payloads
        message: String,
        /// The payload exactly as caught by `catch_unwind`
        payload: Box<dyn Any + Send>,
    },
}

impl Fault {
    /// Wrap an error value.
    pub fn from_error(error: impl Into<BoxError>) -> Self {
        Fault::Error(error.into())
    }

    /// Build a fault from a panic payload caught with `catch_unwind`.
    ///
    /// The payload is kept as is, so a logger can downcast values raised with
    /// [`std::panic::panic_any`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else {
            "<non-string panic payload>".to_string()
        };
        Fault::Panic { message, payload }
    }

    /// Returns true if the producer panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, Fault::Panic { .. })
    }

    /// The captured error, if the producer returned one.
    pub fn as_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Fault::Error(error) => Some(error.as_ref()),
            Fault::Panic { .. } => None,
        }
    }

    /// The panic message, if the producer panicked.
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            Fault::Panic { message, .. } => Some(message),
            Fault::Error(_) => None,
        }
    }

    /// The raw panic payload, if the producer panicked.
    pub fn payload(&self) -> Option<&(dyn Any + Send)> {
        match self {
            Fault::Panic { payload, .. } => Some(payload.as_ref()),
            Fault::Error(_) => None,
        }
    }

    /// Downcast the panic payload to a concrete type.
    ///
    /// ```
    /// use sluice::safe::Fault;
    /// use std::panic::{catch_unwind, panic_any};
    ///
    /// let payload = catch_unwind(|| panic_any(404u16)).unwrap_err();
    /// let fault = Fault::from_panic(payload);
    /// assert_eq!(fault.downcast_ref::<u16>(), Some(&404));
    /// ```
    pub fn downcast_ref<P: Any>(&self) -> Option<&P> {
        self.payload().and_then(|payload| payload.downcast_ref::<P>())
    }

    /// Take the panic payload back, for example to resume unwinding with
    /// [`std::panic::resume_unwind`]. Returns the fault unchanged if it is an
    /// error.
    pub fn into_payload(self) -> Result<Box<dyn Any + Send>, Self> {
        match self {
            Fault::Panic { payload, .. } => Ok(payload),
            error @ Fault::Error(_) => Err(error),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(error) => write!(f, "{}", error),
            Fault::Panic { message, .. } => write!(f, "panicked: {}", message),
        }
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Fault::Error(error) => Some(error.as_ref()),
            Fault::Panic { .. } => None,
        }
    }
}

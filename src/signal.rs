//! The assertion mechanism's terminal signals.
//!
//! A test body ends in exactly one way: it returns `Ok(())`, it returns
//! `Err(Signal)`, or it unwinds. Signals raised by helper routines at any call
//! depth travel back to the runner with `?`, so classification only ever looks
//! at the signal's kind, never at where it came from. Code that cannot return
//! a `Result` can still raise a signal by unwinding with [`Signal::raise`].

use std::fmt;
use std::panic::Location;

use serde::{Serialize, Serializer};

/// Result type every test body, setup and teardown hook returns.
pub type BodyResult = Result<(), Signal>;

/// A tagged terminal signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Explicit early success.
    Pass(Option<String>),
    /// Comparison mismatch or explicit failure.
    Failure {
        reason: String,
        expected: Option<String>,
        actual: Option<String>,
        location: Option<SourceLocation>,
    },
    /// The body deferred judgment.
    Inconclusive(Option<String>),
    /// A fault that did not come through the assertion pathway.
    Fault { category: String, message: String },
}

impl Signal {
    /// A failure located at the caller, or at the caller's caller when
    /// invoked from another `#[track_caller]` function.
    #[track_caller]
    pub fn failure(reason: impl Into<String>) -> Self {
        Signal::Failure {
            reason: reason.into(),
            expected: None,
            actual: None,
            location: Some(SourceLocation::caller()),
        }
    }

    pub fn fault(category: impl Into<String>, message: impl Into<String>) -> Self {
        Signal::Fault {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error as an unrecognized fault. The category is the
    /// error's type name with its module path stripped.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let full = std::any::type_name::<E>();
        let category = full.rsplit("::").next().unwrap_or(full);
        Signal::fault(category, error.to_string())
    }

    /// Unwinds out of the current body carrying this signal. The runner
    /// recovers the payload and classifies it exactly like a returned signal.
    ///
    /// The process panic hook still runs, so each raise prints a
    /// `Box<dyn Any>` panic line to stderr. Prefer returning the signal with
    /// `?` where the call chain allows it.
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }

    /// Drops the source location of a failure. Used where the Rust call site
    /// says nothing about the test, as in the script interpreter.
    pub fn without_location(self) -> Self {
        match self {
            Signal::Failure {
                reason,
                expected,
                actual,
                ..
            } => Signal::Failure {
                reason,
                expected,
                actual,
                location: None,
            },
            other => other,
        }
    }

    /// Whether this signal came through the assertion pathway.
    pub fn is_assertion(&self) -> bool {
        !matches!(self, Signal::Fault { .. })
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Pass(Some(msg)) => write!(f, "passed: {msg}"),
            Signal::Pass(None) => write!(f, "passed"),
            Signal::Failure { reason, .. } => write!(f, "failed: {reason}"),
            Signal::Inconclusive(Some(msg)) => write!(f, "inconclusive: {msg}"),
            Signal::Inconclusive(None) => write!(f, "inconclusive"),
            Signal::Fault { category, message } => write!(f, "{category}: {message}"),
        }
    }
}

/// Source position of a failed assertion, as `file:line:column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl Serialize for SourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Lets bodies use `?` on any standard error; the error becomes an
/// unrecognized fault rather than a failure.
pub trait FaultExt<T> {
    fn or_fault(self) -> Result<T, Signal>;
}

impl<T, E: std::error::Error> FaultExt<T> for Result<T, E> {
    fn or_fault(self) -> Result<T, Signal> {
        self.map_err(|e| Signal::from_error(&e))
    }
}

//! Outcome classification.
//!
//! The runner reduces whatever ended a body to a [`Terminal`] and this module
//! maps it to exactly one [`Outcome`]. Only the signal's kind matters; a
//! failure raised ten helpers deep classifies the same as one raised in the
//! body itself.

use std::any::Any;
use std::fmt;

use serde::Serialize;

use crate::signal::{Signal, SourceLocation};

/// How a body (plus its hooks) ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    Returned,
    Signalled(Signal),
    /// Unwound with a payload that was not a [`Signal`].
    Panicked(String),
}

impl Terminal {
    /// Recovers a terminal from an unwind payload. Signals raised through
    /// [`Signal::raise`] keep their kind; anything else is a panic message.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Signal>() {
            Ok(signal) => return Terminal::Signalled(*signal),
            Err(other) => other,
        };
        Terminal::Panicked(panic_message(payload.as_ref()))
    }

    /// Whether this terminal would classify as `Passed`.
    pub fn is_success(&self) -> bool {
        matches!(self, Terminal::Returned | Terminal::Signalled(Signal::Pass(_)))
    }
}

/// Text of a panic payload. Raised signals render through their `Display`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(signal) = payload.downcast_ref::<Signal>() {
        signal.to_string()
    } else {
        "non-string panic payload".to_string()
    }
}

/// The classified terminal state of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed {
        reason: String,
        expected: Option<String>,
        actual: Option<String>,
        location: Option<SourceLocation>,
    },
    Errored {
        description: String,
    },
    Inconclusive {
        reason: Option<String>,
    },
    Cancelled,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Passed => OutcomeKind::Passed,
            Outcome::Failed { .. } => OutcomeKind::Failed,
            Outcome::Errored { .. } => OutcomeKind::Errored,
            Outcome::Inconclusive { .. } => OutcomeKind::Inconclusive,
            Outcome::Cancelled => OutcomeKind::Cancelled,
        }
    }

    /// Human-readable reason, if the outcome carries one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Failed { reason, .. } => Some(reason),
            Outcome::Errored { description } => Some(description),
            Outcome::Inconclusive { reason } => reason.as_deref(),
            Outcome::Passed | Outcome::Cancelled => None,
        }
    }

    /// Where the failing assertion was called, for failures raised from Rust.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Outcome::Failed { location, .. } => *location,
            _ => None,
        }
    }

    pub fn errored(category: &str, message: &str) -> Self {
        Outcome::Errored {
            description: format!("{category}: {message}"),
        }
    }
}

/// Outcome tag without payload, used for counting and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Passed,
    Failed,
    Errored,
    Inconclusive,
    Cancelled,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Passed => "passed",
            OutcomeKind::Failed => "failed",
            OutcomeKind::Errored => "errored",
            OutcomeKind::Inconclusive => "inconclusive",
            OutcomeKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a terminal to its outcome. First match wins:
/// 1. returned normally, or explicit pass: `Passed`
/// 2. failure through the assertion mechanism: `Failed`
/// 3. explicit inconclusive: `Inconclusive`
/// 4. anything else: `Errored`
pub fn classify(terminal: Terminal) -> Outcome {
    match terminal {
        Terminal::Returned | Terminal::Signalled(Signal::Pass(_)) => Outcome::Passed,
        Terminal::Signalled(Signal::Failure {
            reason,
            expected,
            actual,
            location,
        }) => Outcome::Failed {
            reason,
            expected,
            actual,
            location,
        },
        Terminal::Signalled(Signal::Inconclusive(reason)) => Outcome::Inconclusive { reason },
        Terminal::Signalled(Signal::Fault { category, message }) => {
            Outcome::errored(&category, &message)
        }
        Terminal::Panicked(message) => Outcome::errored("panic", &message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion;

    #[test]
    fn returned_and_explicit_pass_are_passed() {
        assert_eq!(classify(Terminal::Returned), Outcome::Passed);
        assert_eq!(
            classify(Terminal::Signalled(Signal::Pass(Some("Test is valid.".into())))),
            Outcome::Passed
        );
    }

    #[test]
    fn comparison_mismatch_is_failed_with_both_values() {
        let signal = assertion::equal(1, 2).unwrap_err();
        let outcome = classify(Terminal::Signalled(signal));
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        let reason = outcome.reason().unwrap();
        assert!(reason.contains('1') && reason.contains('2'));
        assert!(outcome.location().is_some_and(|l| l.file.ends_with("classifier.rs")));
    }

    #[test]
    fn faults_and_panics_are_errored() {
        let outcome = classify(Terminal::Signalled(Signal::fault(
            "InvalidOperationException",
            "Test-exception",
        )));
        assert_eq!(outcome.kind(), OutcomeKind::Errored);
        assert!(outcome.reason().unwrap().contains("Test-exception"));

        let outcome = classify(Terminal::Panicked("index out of bounds".into()));
        assert_eq!(
            outcome,
            Outcome::Errored {
                description: "panic: index out of bounds".into()
            }
        );
    }

    #[test]
    fn raised_signals_survive_unwinding() {
        let signal = Signal::failure("deep");
        let raised = signal.clone();
        let payload = std::panic::catch_unwind(move || raised.raise()).unwrap_err();
        assert_eq!(Terminal::from_panic(payload), Terminal::Signalled(signal));

        let payload = std::panic::catch_unwind(|| panic!("plain {}", 1)).unwrap_err();
        assert_eq!(Terminal::from_panic(payload), Terminal::Panicked("plain 1".into()));
    }

    #[test]
    fn inconclusive_keeps_its_reason() {
        let outcome = classify(Terminal::Signalled(Signal::Inconclusive(Some("later".into()))));
        assert_eq!(outcome.kind(), OutcomeKind::Inconclusive);
        assert_eq!(outcome.reason(), Some("later"));
    }
}

//! Assertion primitives test bodies call to record a judgment.
//!
//! Every primitive returns [`BodyResult`] so it composes with `?` from any
//! helper depth:
//!
//! ```rust
//! use verdict::assertion;
//! use verdict::signal::BodyResult;
//!
//! fn check(n: i64) -> BodyResult {
//!     assertion::equal(1, n)
//! }
//!
//! assert!(check(1).is_ok());
//! assert!(check(2).is_err());
//! ```

use crate::signal::{BodyResult, Signal, SourceLocation};
use std::fmt::{Debug, Display};

/// Reason used when a body fails without supplying a message.
pub const EXPLICIT_FAILURE: &str = "explicit failure";

/// Compares `expected` against `actual`. A mismatch fails with a reason
/// naming both values.
#[track_caller]
pub fn equal<T: PartialEq + Debug>(expected: T, actual: T) -> BodyResult {
    if expected == actual {
        return Ok(());
    }
    Err(mismatch(format!("{expected:?}"), format!("{actual:?}")))
}

/// Like [`equal`], but renders both sides with `Display`.
#[track_caller]
pub fn equal_display<T: PartialEq + Display>(expected: T, actual: T) -> BodyResult {
    if expected == actual {
        return Ok(());
    }
    Err(mismatch(expected.to_string(), actual.to_string()))
}

/// Builds the failure signal for a comparison mismatch.
#[track_caller]
pub fn mismatch(expected: String, actual: String) -> Signal {
    Signal::Failure {
        reason: format!("Expected: {expected} But was: {actual}"),
        expected: Some(expected),
        actual: Some(actual),
        location: Some(SourceLocation::caller()),
    }
}

/// Fails with `message` unless `condition` holds.
#[track_caller]
pub fn is_true(condition: bool, message: impl Into<String>) -> BodyResult {
    if condition {
        Ok(())
    } else {
        Err(Signal::failure(message))
    }
}

/// Fails immediately. An empty or missing message falls back to a generic reason.
#[track_caller]
pub fn fail(message: Option<&str>) -> BodyResult {
    let reason = match message {
        Some(msg) if !msg.trim().is_empty() => msg.to_string(),
        _ => EXPLICIT_FAILURE.to_string(),
    };
    Err(Signal::failure(reason))
}

/// Ends the body early as passed.
pub fn pass(message: Option<&str>) -> BodyResult {
    Err(Signal::Pass(message.map(str::to_string)))
}

/// Ends the body without a verdict.
pub fn inconclusive(message: Option<&str>) -> BodyResult {
    Err(Signal::Inconclusive(message.map(str::to_string)))
}

/// Raises an unrecognized fault, the equivalent of throwing an exception
/// that the assertion mechanism does not know about.
pub fn fault(category: &str, message: &str) -> BodyResult {
    Err(Signal::fault(category, message))
}

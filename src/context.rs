//! The per-invocation execution context handed to test bodies.

use std::any::Any;

use crate::capture::{Capture, OutputSink};
use crate::signal::Signal;
use crate::value::{FromValue, Value};

/// Everything one invocation's body may touch: its bound arguments, its own
/// fixture-holder instance, and its own output sink. A context is built fresh
/// for every invocation and dropped when the invocation ends.
pub struct TestContext {
    args: Vec<Value>,
    fixture: Option<Box<dyn Any + Send>>,
    output: Capture,
}

impl TestContext {
    pub fn new(args: Vec<Value>, fixture: Option<Box<dyn Any + Send>>, output: Capture) -> Self {
        Self {
            args,
            fixture,
            output,
        }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Reads argument `index` as `T`. A missing or mistyped argument is a
    /// fault, not a failure: the body was bound wrongly.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, Signal> {
        let value = self.args.get(index).ok_or_else(|| {
            Signal::fault(
                "ArgumentError",
                format!("no argument at position {index} ({} bound)", self.args.len()),
            )
        })?;
        T::from_value(value).ok_or_else(|| {
            Signal::fault(
                "ArgumentError",
                format!(
                    "argument {index} is {}, expected {}",
                    value.type_name(),
                    T::KIND
                ),
            )
        })
    }

    /// Emits one chunk of side-channel output.
    pub fn emit(&mut self, text: impl AsRef<str>) {
        self.output.emit(text.as_ref());
    }

    pub fn fixture<T: 'static>(&self) -> Result<&T, Signal> {
        self.fixture
            .as_ref()
            .and_then(|f| f.downcast_ref::<T>())
            .ok_or_else(|| missing_fixture::<T>())
    }

    pub fn fixture_mut<T: 'static>(&mut self) -> Result<&mut T, Signal> {
        self.fixture
            .as_mut()
            .and_then(|f| f.downcast_mut::<T>())
            .ok_or_else(|| missing_fixture::<T>())
    }

    /// Ends the context, handing back the capture for release.
    pub fn into_capture(self) -> Capture {
        self.output
    }
}

fn missing_fixture<T>() -> Signal {
    Signal::fault(
        "FixtureError",
        format!("no fixture of type {}", std::any::type_name::<T>()),
    )
}

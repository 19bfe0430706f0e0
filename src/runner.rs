//! The test runner: one invocation in, one [`TestResult`] out.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, debug_span};

use crate::capture::Capture;
use crate::classifier::{classify, panic_message, Terminal};
use crate::context::TestContext;
use crate::definition::{FixtureFactory, TestBody, TestDefinition};
use crate::diagnostics::{EngineError, EngineResult};
use crate::expander::Invocation;
use crate::report::TestResult;

/// Executes exactly one invocation in isolation.
///
/// Every call builds a fresh fixture holder and a fresh capture scope, runs
/// setup, body and teardown behind an unwind boundary, and turns whatever
/// ended them into a [`TestResult`]. Nothing a body does can escape this
/// function except a fixture factory failure, which is run-level.
#[derive(Debug, Clone, Copy)]
pub struct TestRunner {
    capture_output: bool,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TestRunner {
    pub fn new(capture_output: bool) -> Self {
        Self { capture_output }
    }

    pub fn run(&self, invocation: &Invocation) -> EngineResult<TestResult> {
        let span = debug_span!("invocation", name = %invocation.display_name);
        let _entered = span.enter();

        let definition = &invocation.definition;
        let fixture = match &definition.fixture {
            Some(factory) => Some(build_fixture(factory).map_err(|reason| {
                EngineError::FixtureConstruction {
                    invocation: invocation.display_name.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        let capture = Capture::acquire(self.capture_output);
        let mut ctx = TestContext::new(invocation.args(), fixture, capture);

        let start = Instant::now();
        let terminal = Self::execute(definition, &mut ctx);
        let duration = start.elapsed();

        // The capture is released on every path, including unwinds.
        let output = ctx.into_capture().release();
        let outcome = classify(terminal);
        debug!(outcome = %outcome.kind(), ?duration, "invocation finished");

        Ok(TestResult {
            invocation_name: invocation.display_name.clone(),
            parameters: invocation.parameters.clone(),
            outcome,
            output,
            duration,
        })
    }

    /// Runs setup, body and teardown. A failing setup skips the body and the
    /// teardown. Teardown runs whenever setup succeeded; its own signal only
    /// replaces the body's terminal when the body succeeded.
    fn execute(definition: &TestDefinition, ctx: &mut TestContext) -> Terminal {
        if let Some(setup) = &definition.setup {
            let terminal = guarded(setup, ctx);
            if !terminal.is_success() {
                return terminal;
            }
        }

        let mut terminal = guarded(&definition.body, ctx);

        if let Some(teardown) = &definition.teardown {
            let after = guarded(teardown, ctx);
            if terminal.is_success() && !after.is_success() {
                terminal = after;
            }
        }

        terminal
    }
}

/// Calls the factory behind an unwind boundary; a panic counts as a failed
/// construction.
fn build_fixture(factory: &FixtureFactory) -> Result<Box<dyn Any + Send>, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
        Ok(built) => built,
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn guarded(routine: &TestBody, ctx: &mut TestContext) -> Terminal {
    match panic::catch_unwind(AssertUnwindSafe(|| routine(ctx))) {
        Ok(Ok(())) => Terminal::Returned,
        Ok(Err(signal)) => Terminal::Signalled(signal),
        Err(payload) => Terminal::from_panic(payload),
    }
}

//! Verdict: a test execution and outcome aggregation engine.
//!
//! Definitions flow through the engine in one direction:
//!
//! 1. the [`suite::SuiteAggregator`] takes definitions in discovery order,
//! 2. the [`expander`] turns each into concrete invocations,
//! 3. the [`runner::TestRunner`] executes each invocation under its own
//!    [`capture::Capture`],
//! 4. the [`classifier`] labels what ended the body,
//! 5. results are collected into a [`report::Report`].
//!
//! ```rust
//! use verdict::prelude::*;
//!
//! let suite = TestSuite::new("vstest.Tests")
//!     .test(TestDefinition::new("TestValid", |_| assertion::pass(Some("Test is valid."))))
//!     .test(TestDefinition::new("Test1", |_| assertion::equal(1, 2)));
//!
//! let report = SuiteAggregator::new(RunConfig::default())
//!     .run_suites(&[suite])
//!     .unwrap();
//! assert_eq!(report.summary().passed, 1);
//! assert_eq!(report.summary().failed, 1);
//! assert_ne!(report.exit_code(), 0);
//! ```

pub mod assertion;
pub mod cancel;
pub mod capture;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod definition;
pub mod diagnostics;
pub mod expander;
pub mod report;
pub mod runner;
pub mod script;
pub mod signal;
pub mod suite;
pub mod value;

pub use crate::diagnostics::{EngineError, EngineResult, ExpansionError};

/// Everything needed to define and run tests from Rust.
pub mod prelude {
    pub use crate::assertion;
    pub use crate::cancel::CancelToken;
    pub use crate::classifier::{Outcome, OutcomeKind};
    pub use crate::config::RunConfig;
    pub use crate::context::TestContext;
    pub use crate::definition::{ParameterSet, TestDefinition, TestSuite};
    pub use crate::report::{Report, TestResult};
    pub use crate::signal::{BodyResult, FaultExt, Signal, SourceLocation};
    pub use crate::suite::SuiteAggregator;
    pub use crate::value::{ParamKind, Value};
}

//! The suite aggregator: definitions in, one [`Report`] out.
//!
//! A run happens in three phases:
//! 1. **Planning**: expand every definition in discovery order; a definition
//!    that fails to expand becomes a single `Errored` entry.
//! 2. **Execution**: run planned invocations sequentially or on a rayon pool,
//!    checking the run scope before each one starts.
//! 3. **Reporting**: reorder to discovery order and tally the summary.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::cancel::{CancelToken, RunScope};
use crate::classifier::Outcome;
use crate::config::RunConfig;
use crate::definition::{TestDefinition, TestSuite};
use crate::diagnostics::{EngineResult, ExpansionError};
use crate::expander::{expand, Invocation};
use crate::report::{Report, TestResult};
use crate::runner::TestRunner;

/// How often an abandonable wait re-checks the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(10);

// =============================================================================
// PLANNING
// =============================================================================

/// One entry of the execution plan, in discovery order.
#[derive(Debug, Clone)]
pub enum Planned {
    Invoke(Invocation),
    Rejected { name: String, error: ExpansionError },
}

impl Planned {
    pub fn name(&self) -> &str {
        match self {
            Planned::Invoke(invocation) => &invocation.display_name,
            Planned::Rejected { name, .. } => name,
        }
    }
}

/// Expands every definition in order. Names stay unique across the whole
/// plan: a definition whose invocation collides with an earlier definition's
/// is rejected as a duplicate, and rejected entries get a numeric suffix if
/// their own name is already taken.
pub fn plan(definitions: &[Arc<TestDefinition>]) -> Vec<Planned> {
    // Display name -> the definition and parameter set that claimed it.
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut planned = Vec::new();

    for definition in definitions {
        let expanded = expand(definition).and_then(|invocations| {
            match invocations
                .iter()
                .find_map(|i| seen.get(&i.display_name).map(|first| (i, first)))
            {
                Some((clash, first)) => Err(ExpansionError::DuplicateInvocationName {
                    name: clash.display_name.clone(),
                    first: first.clone(),
                    second: origin(clash),
                }),
                None => Ok(invocations),
            }
        });

        match expanded {
            Ok(invocations) => {
                for invocation in invocations {
                    seen.insert(invocation.display_name.clone(), origin(&invocation));
                    planned.push(Planned::Invoke(invocation));
                }
            }
            Err(error) => {
                warn!(definition = %definition.name, %error, "expansion rejected");
                let name = unique_name(&definition.name, &seen);
                seen.insert(name.clone(), format!("`{}` (rejected)", definition.name));
                planned.push(Planned::Rejected { name, error });
            }
        }
    }

    planned
}

/// Names the definition and parameter set behind an invocation.
fn origin(invocation: &Invocation) -> String {
    match &invocation.parameters {
        Some(set) => format!("`{}` {set}", invocation.definition.name),
        None => format!("`{}` (no parameters)", invocation.definition.name),
    }
}

fn unique_name(base: &str, seen: &HashMap<String, String>) -> String {
    if !seen.contains_key(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base} #{n}"))
        .find(|candidate| !seen.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}

// =============================================================================
// AGGREGATOR
// =============================================================================

/// Drives the runner over a collection of definitions.
pub struct SuiteAggregator {
    config: RunConfig,
    token: CancelToken,
}

impl SuiteAggregator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            token: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Handle for cancelling the run from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Runs every suite in order as a single report.
    pub fn run_suites(&self, suites: &[TestSuite]) -> EngineResult<Report> {
        let definitions: Vec<_> = suites
            .iter()
            .flat_map(|s| s.definitions.iter().cloned())
            .collect();
        self.run(&definitions)
    }

    /// Runs the definitions and produces the report.
    ///
    /// Only run-level faults are returned as errors; every individual
    /// failure, fault or cancellation ends up as a result in the report.
    pub fn run(&self, definitions: &[Arc<TestDefinition>]) -> EngineResult<Report> {
        self.config.validate()?;
        let span = info_span!("run", definitions = definitions.len(), parallel = self.config.parallel);
        let _entered = span.enter();

        let started = Instant::now();
        let planned = plan(definitions);
        let scope = RunScope::start(self.token.clone(), self.config.timeout());
        info!(invocations = planned.len(), "starting run");

        let results = if self.config.parallel {
            self.execute_parallel(&planned, &scope)?
        } else {
            self.execute_sequential(&planned, &scope)?
        };

        let report = Report::new(results, started.elapsed());
        let summary = report.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            inconclusive = summary.inconclusive,
            cancelled = summary.cancelled,
            "run finished"
        );
        Ok(report)
    }

    fn execute_sequential(
        &self,
        planned: &[Planned],
        scope: &RunScope,
    ) -> EngineResult<Vec<TestResult>> {
        planned
            .iter()
            .map(|entry| self.execute_one(entry, scope))
            .collect()
    }

    fn execute_parallel(
        &self,
        planned: &[Planned],
        scope: &RunScope,
    ) -> EngineResult<Vec<TestResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .thread_name(|i| format!("verdict-worker-{i}"))
            .build()?;

        let mut indexed: Vec<(usize, TestResult)> = pool.install(|| {
            planned
                .par_iter()
                .enumerate()
                .map(|(index, entry)| self.execute_one(entry, scope).map(|r| (index, r)))
                .collect::<EngineResult<Vec<_>>>()
        })?;

        // Execution order is never visible in the report.
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    fn execute_one(&self, entry: &Planned, scope: &RunScope) -> EngineResult<TestResult> {
        let invocation = match entry {
            Planned::Rejected { name, error } => return Ok(rejected(name, error)),
            Planned::Invoke(invocation) => invocation,
        };

        if scope.is_cancelled() {
            debug!(name = %invocation.display_name, "not started: run cancelled");
            return Ok(TestResult::cancelled(
                invocation.display_name.clone(),
                invocation.parameters.clone(),
            ));
        }

        let runner = TestRunner::new(self.config.capture_output);
        if self.config.abandon_in_flight {
            run_abandonable(runner, invocation, scope)
        } else {
            runner.run(invocation)
        }
    }
}

fn rejected(name: &str, error: &ExpansionError) -> TestResult {
    TestResult {
        invocation_name: name.to_string(),
        parameters: None,
        outcome: Outcome::errored(error.category(), &error.to_string()),
        output: None,
        duration: Duration::ZERO,
    }
}

/// Runs the invocation on a detached thread and stops waiting once the run
/// is cancelled. An abandoned invocation keeps running in the background but
/// its eventual result is dropped.
fn run_abandonable(
    runner: TestRunner,
    invocation: &Invocation,
    scope: &RunScope,
) -> EngineResult<TestResult> {
    let (tx, rx) = mpsc::channel();
    let owned = invocation.clone();
    let started = Instant::now();

    thread::Builder::new()
        .name("verdict-inflight".to_string())
        .spawn(move || {
            let _ = tx.send(runner.run(&owned));
        })
        .map_err(|e| crate::diagnostics::EngineError::io("<thread>", e))?;

    loop {
        let wait = scope
            .remaining()
            .map_or(CANCEL_POLL, |left| left.min(CANCEL_POLL));
        match rx.recv_timeout(wait) {
            Ok(result) => return result,
            Err(RecvTimeoutError::Timeout) => {
                if scope.is_cancelled() {
                    warn!(name = %invocation.display_name, "abandoning in-flight invocation");
                    let mut result = TestResult::cancelled(
                        invocation.display_name.clone(),
                        invocation.parameters.clone(),
                    );
                    result.duration = started.elapsed();
                    return Ok(result);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Ok(TestResult {
                    invocation_name: invocation.display_name.clone(),
                    parameters: invocation.parameters.clone(),
                    outcome: Outcome::errored("WorkerLost", "invocation thread exited without a result"),
                    output: None,
                    duration: started.elapsed(),
                });
            }
        }
    }
}

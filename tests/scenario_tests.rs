// Outcome classification scenarios driven through the full aggregator.

mod common;

use common::{kinds, names, vstest_suite};
use verdict::prelude::*;

fn run_vstest() -> Report {
    SuiteAggregator::new(RunConfig::default())
        .run_suites(&[vstest_suite()])
        .unwrap()
}

#[test]
fn body_returning_normally_passes() {
    let report = run_vstest();
    let result = report.get("vstest.Tests.TestValid").unwrap();
    assert_eq!(result.outcome, Outcome::Passed);
}

#[test]
fn comparison_mismatch_fails_with_both_values() {
    let report = run_vstest();
    let result = report.get("vstest.Tests.Test1").unwrap();
    assert_eq!(result.kind(), OutcomeKind::Failed);
    let reason = result.outcome.reason().unwrap();
    assert!(reason.contains('2'), "{reason}");
    assert!(reason.contains('1'), "{reason}");
}

#[test]
fn failures_carry_the_assertion_location() {
    let report = run_vstest();
    let direct = report.get("vstest.Tests.Test1").unwrap().outcome.location().unwrap();
    assert!(direct.file.contains("common"), "{direct}");

    let nested = report
        .get("vstest.Tests.SupClassTest(2)")
        .unwrap()
        .outcome
        .location()
        .unwrap();
    assert_eq!(nested.file, direct.file);
    assert_ne!(nested.line, direct.line);

    let errored = report.get("vstest.Tests.Test2").unwrap();
    assert!(errored.outcome.location().is_none());
}

#[test]
fn unrecognized_fault_is_errored() {
    let report = run_vstest();
    let result = report.get("vstest.Tests.Test2").unwrap();
    assert_eq!(result.kind(), OutcomeKind::Errored);
    let description = result.outcome.reason().unwrap();
    assert!(description.contains("Test-exception"));
    assert!(description.starts_with("InvalidOperation"));
}

#[test]
fn explicit_failure_keeps_captured_output() {
    let report = run_vstest();
    let result = report.get("vstest.Tests.Test3").unwrap();
    assert_eq!(result.kind(), OutcomeKind::Failed);
    assert_eq!(result.outcome.reason(), Some(assertion::EXPLICIT_FAILURE));
    assert_eq!(result.captured(), ["Console-output message"]);
}

#[test]
fn parameterized_nested_assertion_splits_by_argument() {
    let report = run_vstest();
    assert_eq!(
        report.get("vstest.Tests.SupClassTest(1)").unwrap().kind(),
        OutcomeKind::Passed
    );
    let second = report.get("vstest.Tests.SupClassTest(2)").unwrap();
    assert_eq!(second.kind(), OutcomeKind::Failed);
    assert_eq!(second.parameters, Some(ParameterSet::new([2])));
}

#[test]
fn report_is_in_discovery_order_with_summary() {
    let report = run_vstest();
    assert_eq!(
        names(&report),
        [
            "vstest.Tests.TestValid",
            "vstest.Tests.Test1",
            "vstest.Tests.Test2",
            "vstest.Tests.Test3",
            "vstest.Tests.SupClassTest(1)",
            "vstest.Tests.SupClassTest(2)",
        ]
    );
    let summary = report.summary();
    assert_eq!(
        (summary.passed, summary.failed, summary.errored, summary.total),
        (2, 3, 1, 6)
    );
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn output_chunks_keep_emission_order() {
    let def = TestDefinition::new("xyz", |ctx| {
        ctx.emit("x");
        ctx.emit("y");
        ctx.emit("z");
        Ok(())
    });
    let report = SuiteAggregator::new(RunConfig::default())
        .run_suites(&[TestSuite::new("").test(def)])
        .unwrap();
    assert_eq!(report.results()[0].captured(), ["x", "y", "z"]);
}

#[test]
fn inconclusive_is_distinct_and_does_not_fail_the_run() {
    let suite = TestSuite::new("s")
        .test(TestDefinition::new("ok", |_| Ok(())))
        .test(TestDefinition::new("later", |_| {
            assertion::inconclusive(Some("needs hardware"))
        }));
    let report = SuiteAggregator::new(RunConfig::default())
        .run_suites(&[suite])
        .unwrap();
    assert_eq!(kinds(&report), [OutcomeKind::Passed, OutcomeKind::Inconclusive]);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn signal_raised_by_unwinding_classifies_by_kind() {
    fn nested_helper() {
        Signal::Inconclusive(None).raise();
    }
    let suite = TestSuite::new("s").test(TestDefinition::new("deep", |_| {
        nested_helper();
        Ok(())
    }));
    let report = SuiteAggregator::new(RunConfig::default())
        .run_suites(&[suite])
        .unwrap();
    assert_eq!(kinds(&report), [OutcomeKind::Inconclusive]);
}

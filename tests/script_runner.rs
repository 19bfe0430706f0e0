// Scripted suites loaded from disk and run through the library.

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use verdict::prelude::*;
use verdict::script;
use verdict::EngineError;

fn fixtures() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn run(path: &Path, config: RunConfig) -> Report {
    let suites = script::discover(path).unwrap();
    SuiteAggregator::new(config).run_suites(&suites).unwrap()
}

#[test]
fn scripted_fixture_matches_expected_outcomes() {
    let report = run(&fixtures().join("vstest.yaml"), RunConfig::default());
    let expected = [
        ("vstest.Tests.TestValid", OutcomeKind::Passed),
        ("vstest.Tests.Test1", OutcomeKind::Failed),
        ("vstest.Tests.Test2", OutcomeKind::Errored),
        ("vstest.Tests.Test3", OutcomeKind::Failed),
        ("vstest.Tests.SupClassTest(1)", OutcomeKind::Passed),
        ("vstest.Tests.SupClassTest(2)", OutcomeKind::Failed),
    ];
    assert_eq!(report.results().len(), expected.len());
    for (result, (name, kind)) in report.results().iter().zip(expected) {
        assert_eq!(result.invocation_name, name);
        assert_eq!(result.kind(), kind, "{name}");
    }

    assert_eq!(
        report.get("vstest.Tests.Test1").unwrap().outcome.reason(),
        Some("Expected: 1 But was: 2")
    );
    assert_eq!(
        report.get("vstest.Tests.Test2").unwrap().outcome.reason(),
        Some("InvalidOperationException: Test-exception")
    );
    assert_eq!(
        report.get("vstest.Tests.Test3").unwrap().captured(),
        ["Console-output message"]
    );
    // Interpreter call sites say nothing about the suite file.
    assert!(report
        .results()
        .iter()
        .all(|result| result.outcome.location().is_none()));
}

#[test]
fn scripted_fixture_state_is_fresh_per_invocation() {
    for config in [RunConfig::default(), RunConfig::default().with_parallel(3)] {
        let report = run(&fixtures().join("passing.yaml"), config);
        let summary = report.summary();
        assert_eq!((summary.passed, summary.inconclusive), (3, 1));
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            report.get("passing.counts_from_fresh_state(2)").unwrap().captured(),
            ["2"]
        );
    }
}

#[test]
fn directory_discovery_is_sorted_by_file_name() {
    let suites = script::discover(fixtures()).unwrap();
    let names: Vec<_> = suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["passing", "vstest.Tests"]);
}

#[test]
fn suite_name_defaults_to_file_stem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("smoke.yml");
    fs::write(&path, "tests:\n  - name: ok\n    steps: []\n").unwrap();
    let report = run(dir.path(), RunConfig::default());
    assert_eq!(report.results()[0].invocation_name, "smoke.ok");
    assert_eq!(report.results()[0].kind(), OutcomeKind::Passed);
}

#[test]
fn scripted_panic_and_teardown() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("edge.yaml"),
        r#"
name: edge
tests:
  - name: explodes
    steps:
      - panic: kaboom
  - name: teardown_masks_success
    teardown:
      - fail: cleanup failed
  - name: teardown_does_not_mask_failure
    steps:
      - fail: body failed
    teardown:
      - fail: cleanup failed
"#,
    )
    .unwrap();
    let report = run(dir.path(), RunConfig::default());
    assert_eq!(
        report.get("edge.explodes").unwrap().outcome.reason(),
        Some("panic: kaboom")
    );
    assert_eq!(
        report.get("edge.teardown_masks_success").unwrap().outcome.reason(),
        Some("cleanup failed")
    );
    assert_eq!(
        report.get("edge.teardown_does_not_mask_failure").unwrap().outcome.reason(),
        Some("body failed")
    );
}

#[test]
fn missing_path_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = script::discover(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));
}

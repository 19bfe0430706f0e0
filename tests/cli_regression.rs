// Regression tests for the `verdict` binary: exit codes, report formats and
// miette diagnostics for run-level errors.

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::tempdir;

const VSTEST: &str = "tests/fixtures/vstest.yaml";
const PASSING: &str = "tests/fixtures/passing.yaml";

fn verdict() -> Command {
    Command::cargo_bin("verdict").unwrap()
}

#[test]
fn failing_suite_exits_nonzero_with_console_report() {
    verdict()
        .args(["run", VSTEST, "--no-color"])
        .assert()
        .code(1)
        .stdout(contains("FAIL: vstest.Tests.Test1"))
        .stdout(contains("ERROR: vstest.Tests.Test2"))
        .stdout(contains("  | Console-output message"))
        .stdout(contains("Test result: FAILED"));
}

#[test]
fn passing_suite_exits_zero() {
    verdict()
        .args(["run", PASSING, "--no-color", "--parallel"])
        .assert()
        .success()
        .stdout(contains("INCONCLUSIVE: passing.deferred"))
        .stdout(contains("Test result: PASSED"));
}

#[test]
fn json_report_carries_results_and_summary() {
    let output = verdict()
        .args(["run", VSTEST, "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summary = &json["summary"];
    assert_eq!(summary["passed"], 2);
    assert_eq!(summary["failed"], 3);
    assert_eq!(summary["errored"], 1);
    assert_eq!(summary["total"], 6);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results[3]["invocationName"], "vstest.Tests.Test3");
    assert_eq!(results[3]["outcomeKind"], "failed");
    assert_eq!(results[3]["capturedOutput"][0], "Console-output message");
    assert_eq!(results[0]["capturedOutput"], serde_json::json!([]));
}

#[test]
fn filter_narrows_the_run() {
    verdict()
        .args(["run", VSTEST, "--filter", "TestValid", "--no-color", "-v"])
        .assert()
        .success()
        .stdout(contains("PASS: vstest.Tests.TestValid"))
        .stdout(contains("total 1"));
}

#[test]
fn list_prints_invocation_names_in_order() {
    verdict()
        .args(["list", VSTEST])
        .assert()
        .success()
        .stdout(contains(
            "vstest.Tests.SupClassTest(1)\nvstest.Tests.SupClassTest(2)",
        ));
}

#[test]
fn malformed_suite_reports_a_diagnostic() {
    let dir = tempdir().unwrap();
    let bad_file = dir.path().join("bad.yaml");
    fs::write(&bad_file, "tests: [").unwrap();

    verdict()
        .arg("run")
        .arg(&bad_file)
        .assert()
        .code(2)
        .stderr(contains("verdict::parse").or(contains("help:")));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("verdict.yaml");
    fs::write(&config, "parallel: true\nmaxWorkers: 0\n").unwrap();

    verdict()
        .args(["run", VSTEST, "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(contains("verdict::config::invalid"));
}

//! Results and the run report.
//!
//! A [`Report`] is built once, after every invocation has produced its
//! [`TestResult`], and is never mutated afterwards. Its JSON form is the
//! boundary consumed by reporting collaborators:
//!
//! ```json
//! {
//!   "results": [{"invocationName": "...", "outcomeKind": "failed",
//!                "reason": "...", "location": "tests/math.rs:12:5",
//!                "capturedOutput": ["..."], "durationMs": 3}],
//!   "summary": {"passed": 1, "failed": 1, "errored": 0, "inconclusive": 0,
//!               "cancelled": 0, "total": 2, "totalDurationMs": 5}
//! }
//! ```

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::capture::CapturedOutput;
use crate::classifier::{Outcome, OutcomeKind};
use crate::definition::ParameterSet;
use crate::signal::SourceLocation;

/// The result of exactly one invocation.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub invocation_name: String,
    pub parameters: Option<ParameterSet>,
    pub outcome: Outcome,
    pub output: Option<CapturedOutput>,
    pub duration: Duration,
}

impl TestResult {
    pub fn kind(&self) -> OutcomeKind {
        self.outcome.kind()
    }

    /// Result for an invocation that never started.
    pub fn cancelled(invocation_name: impl Into<String>, parameters: Option<ParameterSet>) -> Self {
        Self {
            invocation_name: invocation_name.into(),
            parameters,
            outcome: Outcome::Cancelled,
            output: None,
            duration: Duration::ZERO,
        }
    }

    pub fn captured(&self) -> &[String] {
        self.output.as_ref().map(|o| o.chunks()).unwrap_or(&[])
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord<'a> {
    invocation_name: &'a str,
    outcome_kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    captured_output: Option<&'a CapturedOutput>,
    duration_ms: u64,
}

impl Serialize for TestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultRecord {
            invocation_name: &self.invocation_name,
            outcome_kind: self.kind(),
            reason: self.outcome.reason(),
            location: self.outcome.location(),
            captured_output: self.output.as_ref(),
            duration_ms: millis(self.duration),
        }
        .serialize(serializer)
    }
}

/// Per-kind counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub inconclusive: usize,
    pub cancelled: usize,
    pub total: usize,
    #[serde(rename = "totalDurationMs", serialize_with = "serialize_millis")]
    pub total_duration: Duration,
}

impl Summary {
    fn tally(results: &[TestResult], elapsed: Duration) -> Self {
        let mut summary = Summary {
            total: results.len(),
            total_duration: elapsed,
            ..Summary::default()
        };
        for result in results {
            match result.kind() {
                OutcomeKind::Passed => summary.passed += 1,
                OutcomeKind::Failed => summary.failed += 1,
                OutcomeKind::Errored => summary.errored += 1,
                OutcomeKind::Inconclusive => summary.inconclusive += 1,
                OutcomeKind::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }

    /// Whether the run counts as failed. Inconclusive results alone do not.
    pub fn has_failures(&self) -> bool {
        self.failed + self.errored + self.cancelled > 0
    }
}

/// Ordered results plus summary counts for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    results: Vec<TestResult>,
    summary: Summary,
}

impl Report {
    /// Builds the report. `elapsed` is the wall-clock time of the whole run.
    pub fn new(results: Vec<TestResult>, elapsed: Duration) -> Self {
        let summary = Summary::tally(&results, elapsed);
        Self { results, summary }
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn get(&self, invocation_name: &str) -> Option<&TestResult> {
        self.results
            .iter()
            .find(|r| r.invocation_name == invocation_name)
    }

    /// Process exit status: zero only when nothing failed, errored or was cancelled.
    pub fn exit_code(&self) -> i32 {
        if self.summary.has_failures() {
            1
        } else {
            0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(millis(*duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: Outcome) -> TestResult {
        TestResult {
            invocation_name: name.into(),
            parameters: None,
            outcome,
            output: None,
            duration: Duration::from_millis(2),
        }
    }

    #[test]
    fn summary_counts_each_kind() {
        let report = Report::new(
            vec![
                result("a", Outcome::Passed),
                result("b", Outcome::Inconclusive { reason: None }),
                result("c", Outcome::errored("X", "y")),
                TestResult::cancelled("d", None),
            ],
            Duration::from_millis(9),
        );
        let summary = report.summary();
        assert_eq!(
            (summary.passed, summary.inconclusive, summary.errored, summary.cancelled),
            (1, 1, 1, 1)
        );
        assert_eq!(summary.total, 4);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn inconclusive_alone_does_not_fail_the_run() {
        let report = Report::new(
            vec![
                result("a", Outcome::Passed),
                result("b", Outcome::Inconclusive { reason: None }),
            ],
            Duration::ZERO,
        );
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn json_uses_boundary_field_names() {
        let mut failed = result(
            "Test3",
            Outcome::Failed {
                reason: "explicit failure".into(),
                expected: None,
                actual: None,
                location: Some(SourceLocation {
                    file: "tests/vstest.rs",
                    line: 29,
                    column: 9,
                }),
            },
        );
        failed.output = Some(CapturedOutput(vec!["Console-output message".into()]));
        let report = Report::new(vec![result("TestValid", Outcome::Passed), failed], Duration::from_millis(4));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let first = &json["results"][0];
        assert_eq!(first["invocationName"], "TestValid");
        assert_eq!(first["outcomeKind"], "passed");
        assert!(first.get("reason").is_none());

        let second = &json["results"][1];
        assert_eq!(second["reason"], "explicit failure");
        assert_eq!(second["location"], "tests/vstest.rs:29:9");
        assert!(first.get("location").is_none());
        assert_eq!(second["capturedOutput"][0], "Console-output message");
        assert_eq!(second["durationMs"], 2);

        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["summary"]["totalDurationMs"], 4);
    }
}

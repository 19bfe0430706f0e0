//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for pretty-printing reports, colorizing
//! outcomes, showing expected/actual diffs, and generating JSON. By
//! centralizing output logic here, every command renders results the same way.

use std::borrow::Cow;
use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::classifier::{Outcome, OutcomeKind};
use crate::report::{Report, TestResult};

/// Longest reason the console prints before truncating.
const MAX_REASON_LEN: usize = 512;

// ============================================================================
// CONSOLE REPORTER
// ============================================================================

/// Renders a report for humans.
pub struct ConsoleReporter {
    /// Print every result, not only the ones that need attention.
    pub verbose: bool,
    pub color: ColorChoice,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, no_color: bool) -> Self {
        let color = if no_color || !atty::is(atty::Stream::Stdout) {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self { verbose, color }
    }

    /// Writes the report to stdout.
    pub fn print(&self, report: &Report) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color);
        self.write(&mut stdout, report)
    }

    pub fn write<W: WriteColor>(&self, out: &mut W, report: &Report) -> io::Result<()> {
        for result in report.results() {
            if self.verbose || result.kind() != OutcomeKind::Passed {
                write_result(out, result)?;
            }
        }
        writeln!(out)?;
        write_summary(out, report)
    }
}

/// Writes the report as pretty JSON to stdout.
pub fn print_json(report: &Report) -> io::Result<()> {
    let json = report.to_json().map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn label(kind: OutcomeKind) -> (&'static str, Color) {
    match kind {
        OutcomeKind::Passed => ("PASS", Color::Green),
        OutcomeKind::Failed => ("FAIL", Color::Red),
        OutcomeKind::Errored => ("ERROR", Color::Magenta),
        OutcomeKind::Inconclusive => ("INCONCLUSIVE", Color::Yellow),
        OutcomeKind::Cancelled => ("CANCELLED", Color::Cyan),
    }
}

fn write_result<W: WriteColor>(out: &mut W, result: &TestResult) -> io::Result<()> {
    let (text, color) = label(result.kind());
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{text}")?;
    out.reset()?;
    writeln!(out, ": {} ({:.2?})", result.invocation_name, result.duration)?;

    match &result.outcome {
        Outcome::Failed {
            expected: Some(expected),
            actual: Some(actual),
            reason,
            ..
        } => {
            write_reason(out, reason)?;
            if expected.contains('\n') || actual.contains('\n') {
                let changeset = Changeset::new(expected, actual, "\n");
                write_diff(out, &changeset.diffs)?;
            }
        }
        outcome => {
            if let Some(reason) = outcome.reason() {
                write_reason(out, reason)?;
            }
        }
    }
    if let Some(location) = result.outcome.location() {
        writeln!(out, "  at {location}")?;
    }

    if !result.captured().is_empty() {
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "  output:")?;
        for chunk in result.captured() {
            writeln!(out, "  | {chunk}")?;
        }
        out.reset()?;
    }
    Ok(())
}

fn write_reason<W: WriteColor>(out: &mut W, reason: &str) -> io::Result<()> {
    for line in truncated(reason).lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

/// Cuts reasons longer than [`MAX_REASON_LEN`] characters. The JSON report
/// always carries the full text.
fn truncated(reason: &str) -> Cow<'_, str> {
    match reason.char_indices().nth(MAX_REASON_LEN) {
        Some((cut, _)) => Cow::Owned(format!("{} [TRUNCATED]", &reason[..cut])),
        None => Cow::Borrowed(reason),
    }
}

fn write_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                writeln!(out, "   {x}")?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "  +{x}")?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "  -{x}")?;
            }
        }
    }
    out.reset()
}

fn write_summary<W: WriteColor>(out: &mut W, report: &Report) -> io::Result<()> {
    let summary = report.summary();
    let (status, color) = if summary.has_failures() {
        ("FAILED", Color::Red)
    } else {
        ("PASSED", Color::Green)
    };

    write!(out, "Test result: ")?;
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{status}")?;
    out.reset()?;
    writeln!(
        out,
        " | total {}, passed {}, failed {}, errored {}, inconclusive {}, cancelled {}",
        summary.total,
        summary.passed,
        summary.failed,
        summary.errored,
        summary.inconclusive,
        summary.cancelled
    )?;
    writeln!(out, "Time: {:.2?}", summary.total_duration)
}

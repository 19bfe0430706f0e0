//! The Verdict Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions: discovery of scripted suites, configuration,
//! the suite aggregator, and report rendering.

use std::path::Path;
use std::process;

use clap::Parser;
use miette::Report as Diagnostic;
use tracing::debug;

use crate::cli::args::{Command, Format, RunOptions, VerdictArgs};
use crate::cli::output::{print_json, ConsoleReporter};
use crate::config::RunConfig;
use crate::definition::TestSuite;
use crate::diagnostics::{EngineError, EngineResult};
use crate::script;
use crate::suite::{plan, SuiteAggregator};

pub mod args;
pub mod output;

/// Exit status for run-level errors reported outside the report.
const EXIT_ENGINE_ERROR: i32 = 2;

/// The main entry point for the CLI.
pub fn run() {
    let args = VerdictArgs::parse();

    let result = match args.command {
        Command::Run { path, options } => handle_run(&path, &options),
        Command::List { path, filter } => handle_list(&path, filter.as_deref()),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{:?}", Diagnostic::new(e));
            process::exit(EXIT_ENGINE_ERROR);
        }
    }
}

/// Handles the `run` subcommand. Returns the report's exit status.
fn handle_run(path: &Path, options: &RunOptions) -> EngineResult<i32> {
    let config = resolve_config(options)?;
    debug!(?config, "resolved run configuration");

    let suites = load_suites(path, options.filter.as_deref())?;
    let report = SuiteAggregator::new(config).run_suites(&suites)?;

    let rendered = match options.format {
        Format::Json => print_json(&report),
        Format::Console => ConsoleReporter::new(options.verbose, options.no_color).print(&report),
    };
    rendered.map_err(|e| EngineError::io("<stdout>", e))?;

    Ok(report.exit_code())
}

/// Handles the `list` subcommand.
fn handle_list(path: &Path, filter: Option<&str>) -> EngineResult<i32> {
    let suites = load_suites(path, filter)?;
    let definitions: Vec<_> = suites
        .iter()
        .flat_map(|s| s.definitions.iter().cloned())
        .collect();
    for entry in plan(&definitions) {
        println!("{}", entry.name());
    }
    Ok(0)
}

fn load_suites(path: &Path, filter: Option<&str>) -> EngineResult<Vec<TestSuite>> {
    let suites = script::discover(path)?;
    Ok(match filter {
        Some(pattern) => suites.iter().map(|s| s.filter(pattern)).collect(),
        None => suites,
    })
}

/// Config file first, then command-line flags on top.
fn resolve_config(options: &RunOptions) -> EngineResult<RunConfig> {
    let mut config = match &options.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if options.parallel {
        config.parallel = true;
    }
    if let Some(workers) = options.max_workers {
        config = config.with_parallel(workers);
    }
    if options.no_capture {
        config = config.with_capture(false);
    }
    if let Some(timeout_ms) = options.timeout_ms {
        config = config.with_timeout(timeout_ms);
    }
    if options.abandon_in_flight {
        config = config.with_abandon_in_flight(true);
    }
    config.validate()?;
    Ok(config)
}

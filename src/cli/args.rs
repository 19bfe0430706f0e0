//! Defines the command-line arguments and subcommands for the Verdict CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "verdict",
    version,
    about = "Runs scripted test suites and reports classified outcomes."
)]
pub struct VerdictArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover and run every suite under a path.
    Run {
        /// A suite file or a directory of suite files.
        #[arg(default_value = "tests")]
        path: PathBuf,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Print the invocation names a run would execute, in report order.
    List {
        /// A suite file or a directory of suite files.
        #[arg(default_value = "tests")]
        path: PathBuf,
        /// Only list tests whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
    },
}

/// Options for the `run` subcommand. Flags override the config file.
#[derive(Debug, Clone, Args)]
pub struct RunOptions {
    /// YAML file with run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Run invocations on a worker pool.
    #[arg(long)]
    pub parallel: bool,
    /// Worker pool size; implies --parallel.
    #[arg(long)]
    pub max_workers: Option<usize>,
    /// Let test output go straight to stdout instead of capturing it.
    #[arg(long)]
    pub no_capture: bool,
    /// Cancel the run after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Stop waiting for in-flight invocations once cancelled.
    #[arg(long)]
    pub abandon_in_flight: bool,
    /// Only run tests whose name contains this substring.
    #[arg(long)]
    pub filter: Option<String>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Console)]
    pub format: Format,
    /// Disable colored console output.
    #[arg(long)]
    pub no_color: bool,
    /// Show every result, not only failures.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Console,
    Json,
}

//! Error types for the verdict engine.
//!
//! Two layers exist. [`ExpansionError`] is scoped to a single definition: it is
//! recorded as an `Errored` result and the run carries on. [`EngineError`] is
//! run-level: it escapes the report entirely and is rendered by the CLI as a
//! `miette` diagnostic.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Convenience alias for run-level results.
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// EXPANSION ERRORS
// ============================================================================

/// Raised by the case expander; fatal to one definition only.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ExpansionError {
    #[error("duplicate invocation name `{name}`: parameter sets {first} and {second} render identically")]
    #[diagnostic(
        code(verdict::expand::duplicate_name),
        help("give each parameter set distinct values")
    )]
    DuplicateInvocationName {
        name: String,
        first: String,
        second: String,
    },

    #[error("parameter set {index} of `{definition}` does not match the declared parameters: {reason}")]
    #[diagnostic(code(verdict::expand::parameter_mismatch))]
    ParameterMismatch {
        definition: String,
        index: usize,
        reason: String,
    },
}

impl ExpansionError {
    /// Category string used when the error is surfaced as an `Errored` outcome.
    pub fn category(&self) -> &'static str {
        match self {
            ExpansionError::DuplicateInvocationName { .. } => "DuplicateInvocationName",
            ExpansionError::ParameterMismatch { .. } => "ParameterMismatch",
        }
    }
}

// ============================================================================
// RUN-LEVEL ERRORS
// ============================================================================

/// Errors that abort a run and are reported outside the report.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("could not construct fixture holder for `{invocation}`: {reason}")]
    #[diagnostic(
        code(verdict::run::fixture),
        help("fixture factories must succeed for every invocation of a definition")
    )]
    FixtureConstruction { invocation: String, reason: String },

    #[error("failed to build worker pool")]
    #[diagnostic(code(verdict::run::worker_pool))]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(verdict::config::invalid))]
    Config { message: String },

    #[error("failed to parse {kind} `{path}`")]
    #[diagnostic(code(verdict::parse))]
    Parse {
        kind: &'static str,
        path: PathBuf,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid suite `{path}`: {message}")]
    #[diagnostic(code(verdict::suite::invalid))]
    Suite { path: PathBuf, message: String },

    #[error("I/O error on `{path}`")]
    #[diagnostic(code(verdict::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a labelled parse error from a `serde_yaml` failure over `content`.
    pub fn yaml(
        kind: &'static str,
        path: impl Into<PathBuf>,
        content: &str,
        error: &serde_yaml::Error,
    ) -> Self {
        let path = path.into();
        let span = error
            .location()
            .map(|loc| SourceSpan::from((loc.index().min(content.len()), 1)));
        EngineError::Parse {
            kind,
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            path,
            span,
            message: error.to_string(),
        }
    }
}

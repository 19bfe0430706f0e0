//! Run configuration.
//!
//! Recognized options mirror the report boundary's camelCase naming so the
//! same keys work in a YAML config file:
//!
//! ```yaml
//! parallel: true
//! maxWorkers: 4
//! captureOutput: true
//! timeoutMs: 30000
//! abandonInFlight: false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::diagnostics::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RunConfig {
    /// Run invocations on a worker pool instead of one at a time.
    pub parallel: bool,
    /// Pool size when `parallel` is set.
    pub max_workers: usize,
    /// Buffer side-channel output per invocation.
    pub capture_output: bool,
    /// Run-scoped cancellation deadline.
    pub timeout_ms: Option<u64>,
    /// Stop waiting for in-flight invocations once the run is cancelled.
    pub abandon_in_flight: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_workers: default_workers(),
            capture_output: true,
            timeout_ms: None,
            abandon_in_flight: false,
        }
    }
}

impl RunConfig {
    /// Loads a config file; missing keys take their defaults.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let config: RunConfig = if content.trim().is_empty() {
            RunConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| EngineError::yaml("config", path, &content, &e))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_workers == 0 {
            return Err(EngineError::config("maxWorkers must be at least 1"));
        }
        if self.timeout_ms == Some(0) {
            return Err(EngineError::config("timeoutMs must be positive when set"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn with_parallel(mut self, max_workers: usize) -> Self {
        self.parallel = true;
        self.max_workers = max_workers;
        self
    }

    pub fn with_capture(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_abandon_in_flight(mut self, abandon: bool) -> Self {
        self.abandon_in_flight = abandon;
        self
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

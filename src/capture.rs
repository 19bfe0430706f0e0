//! Per-invocation output capture.
//!
//! Test bodies never write to the process stdout directly; they emit through
//! the [`OutputSink`] held by their [`TestContext`](crate::context::TestContext).
//! Each invocation acquires its own [`Capture`], so a buffer can never see
//! another invocation's chunks, even when invocations run on a worker pool.

use serde::Serialize;

// ============================================================================
// OUTPUT SINKS
// ============================================================================

/// Destination for side-channel text emitted by a test body.
pub trait OutputSink: Send {
    fn emit(&mut self, text: &str);
}

/// CaptureBuffer: collects emitted chunks in order.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    chunks: Vec<String>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn into_output(self) -> CapturedOutput {
        CapturedOutput(self.chunks)
    }
}

impl OutputSink for CaptureBuffer {
    fn emit(&mut self, text: &str) {
        self.chunks.push(text.to_string());
    }
}

/// StdoutSink: writes straight through to stdout when capture is off.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

// ============================================================================
// SCOPED CAPTURE
// ============================================================================

/// Output captured during one invocation, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapturedOutput(pub Vec<String>);

impl CapturedOutput {
    pub fn chunks(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The sink one invocation writes to between acquisition and release.
pub enum Capture {
    Buffered(CaptureBuffer),
    Passthrough(StdoutSink),
}

impl Capture {
    /// Starts a capture scope. Every acquisition begins with an empty buffer.
    pub fn acquire(enabled: bool) -> Self {
        if enabled {
            Capture::Buffered(CaptureBuffer::new())
        } else {
            Capture::Passthrough(StdoutSink)
        }
    }

    /// Ends the scope, yielding the buffered chunks. Passthrough captures
    /// have nothing to deliver.
    pub fn release(self) -> Option<CapturedOutput> {
        match self {
            Capture::Buffered(buffer) => Some(buffer.into_output()),
            Capture::Passthrough(_) => None,
        }
    }
}

impl OutputSink for Capture {
    fn emit(&mut self, text: &str) {
        match self {
            Capture::Buffered(buffer) => buffer.emit(text),
            Capture::Passthrough(stdout) => stdout.emit(text),
        }
    }
}

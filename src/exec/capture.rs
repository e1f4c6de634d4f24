//! Per-execution console capture for the JavaScript branch.
//!
//! Instead of redirecting a process-global output channel and restoring it
//! afterwards, each execution gets its own [`ConsoleCapture`] injected into a
//! throwaway JS context. The sink dies with the run, so nothing can leak into
//! the host's logging or into a later execution.

use std::sync::{Arc, Mutex};

/// Console channels recognized by the capture sink.
///
/// The wire tags match the names the in-context console shim emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `console.log` output, kept verbatim.
    Log,
    /// `console.warn`, folded into the log list with a `WARNING:` prefix.
    Warn,
    /// `console.info`, folded into the log list with an `INFO:` prefix.
    Info,
    /// `console.error`, collected separately with an `ERROR:` prefix.
    Error,
    /// The completion value of the program, rendered as a `Returned:` line.
    Return,
    /// A thrown error, rendered as an `Execution Error:` line.
    Exception,
}

impl Channel {
    /// Parse a channel tag; unknown tags fall back to `Log`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "error" => Channel::Error,
            "warn" => Channel::Warn,
            "info" => Channel::Info,
            "return" => Channel::Return,
            "exception" => Channel::Exception,
            _ => Channel::Log,
        }
    }
}

#[derive(Debug, Default)]
struct CaptureState {
    logs: Vec<String>,
    errors: Vec<String>,
}

/// A buffering sink for one execution's console traffic.
///
/// Clones share the same buffer, so a clone can be moved into the JS engine
/// callback while the caller keeps reading the capture afterwards.
#[derive(Clone, Debug, Default)]
pub struct ConsoleCapture {
    state: Arc<Mutex<CaptureState>>,
}

impl ConsoleCapture {
    /// Create a new empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message on the given channel.
    pub fn emit(&self, channel: Channel, text: &str) {
        let mut state = self.state.lock().unwrap();
        match channel {
            Channel::Log => state.logs.push(text.to_string()),
            Channel::Warn => state.logs.push(format!("WARNING: {text}")),
            Channel::Info => state.logs.push(format!("INFO: {text}")),
            Channel::Return => state.logs.push(format!("Returned: {text}")),
            Channel::Error => state.errors.push(format!("ERROR: {text}")),
            Channel::Exception => state.errors.push(format!("Execution Error: {text}")),
        }
    }

    /// True if any error-channel message was recorded.
    pub fn has_errors(&self) -> bool {
        !self.state.lock().unwrap().errors.is_empty()
    }

    /// True if nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.logs.is_empty() && state.errors.is_empty()
    }

    /// Render the capture: log lines first, then error lines.
    ///
    /// Returns `None` when nothing was captured so the caller can substitute
    /// its empty-output message.
    pub fn render(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        if state.logs.is_empty() && state.errors.is_empty() {
            return None;
        }
        let mut lines: Vec<&str> = Vec::with_capacity(state.logs.len() + state.errors.len());
        lines.extend(state.logs.iter().map(String::as_str));
        lines.extend(state.errors.iter().map(String::as_str));
        Some(lines.join("\n"))
    }
}

//! Error types for the playground execution core.

use thiserror::Error;

/// Errors that can occur while preparing or running playground code.
#[derive(Error, Debug)]
pub enum PlaygroundError {
    /// The Python interpreter runtime could not be bootstrapped.
    ///
    /// Not cached: the next execution attempt retries the bootstrap.
    #[error("Python environment unavailable: {0}")]
    EnvironmentUnavailable(#[source] anyhow::Error),

    /// The interpreter wasm file was not found on disk.
    #[error("Python interpreter wasm not found at: {0}")]
    InterpreterNotFound(String),

    /// The execution exceeded the configured wall-clock timeout.
    #[error("execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The execution exceeded the configured memory limit.
    #[error("memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    /// The submitted program failed for a reason other than a classified
    /// interpreter exception.
    #[error("execution failed: {0}")]
    ExecutionFault(String),

    /// A Python exception was raised by the submitted program.
    #[error("Python {exception_type}: {message}")]
    PythonException {
        /// The exception type, e.g. "ValueError".
        exception_type: String,
        /// The exception message.
        message: String,
        /// The full traceback, when present in stderr.
        traceback: Option<String>,
    },

    /// Malformed markup in the HTML preview branch.
    #[error("markup parse error: {0}")]
    ParseFault(String),

    /// I/O error while loading the interpreter.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaygroundError {
    /// Check if this error represents a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PlaygroundError::Timeout(_))
    }

    /// Check if this error represents a memory limit violation.
    pub fn is_memory_limit(&self) -> bool {
        matches!(self, PlaygroundError::MemoryLimitExceeded(_))
    }

    /// Check if this error represents a classified Python exception.
    pub fn is_python_exception(&self) -> bool {
        matches!(self, PlaygroundError::PythonException { .. })
    }
}

/// Result type alias for playground operations.
pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Classify a Python exception from interpreter stderr.
///
/// Scans the stderr text for the final exception line ("SomeError: message")
/// and, when a traceback header precedes it, keeps the traceback slice.
/// Returns `None` when stderr does not look like a Python exception.
pub fn parse_python_exception(stderr: &str) -> Option<PlaygroundError> {
    if stderr.trim().is_empty() {
        return None;
    }

    let lines: Vec<&str> = stderr.lines().collect();

    let mut traceback_start = None;
    let mut exception_line = None;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("Traceback (most recent call last):") {
            traceback_start = Some(i);
        } else if !line.starts_with(' ') && looks_like_exception(line) {
            // The exception line is the last non-indented line of the dump
            exception_line = Some(i);
        }
    }

    let line_idx = exception_line?;
    let raw = lines[line_idx];

    let (exception_type, message) = match raw.find(':') {
        Some(colon) => (
            raw[..colon].trim().to_string(),
            raw[colon + 1..].trim().to_string(),
        ),
        None => (raw.trim().to_string(), String::new()),
    };

    let traceback = traceback_start.map(|start| lines[start..=line_idx].join("\n"));

    Some(PlaygroundError::PythonException {
        exception_type,
        message,
        traceback,
    })
}

/// Heuristic for whether a stderr line is a Python exception line.
fn looks_like_exception(line: &str) -> bool {
    if !line.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        return false;
    }

    let boundary_ok = |rest: &str| {
        rest.is_empty() || rest.starts_with(':') || rest.starts_with(' ') || rest.starts_with('\n')
    };

    // "ValueError: ...", "RuntimeWarning", "CustomException"
    for suffix in ["Error", "Exception", "Warning"] {
        if let Some(idx) = line.find(suffix) {
            if boundary_ok(&line[idx + suffix.len()..]) {
                return true;
            }
        }
    }

    // Builtins that carry none of the suffixes above
    for name in [
        "KeyboardInterrupt",
        "SystemExit",
        "StopIteration",
        "GeneratorExit",
    ] {
        if let Some(rest) = line.strip_prefix(name) {
            if boundary_ok(rest) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_exception() {
        let stderr = "ValueError: invalid literal for int() with base 10: 'abc'";
        let result = parse_python_exception(stderr);

        match result {
            Some(PlaygroundError::PythonException {
                exception_type,
                message,
                traceback,
            }) => {
                assert_eq!(exception_type, "ValueError");
                assert_eq!(message, "invalid literal for int() with base 10: 'abc'");
                assert!(traceback.is_none());
            }
            other => panic!("expected PythonException, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exception_with_traceback() {
        let stderr = r#"Traceback (most recent call last):
  File "<string>", line 1, in <module>
ValueError: invalid value"#;

        match parse_python_exception(stderr) {
            Some(PlaygroundError::PythonException {
                exception_type,
                message,
                traceback,
            }) => {
                assert_eq!(exception_type, "ValueError");
                assert_eq!(message, "invalid value");
                assert!(traceback.unwrap().contains("Traceback"));
            }
            other => panic!("expected PythonException, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exception_no_message() {
        match parse_python_exception("StopIteration") {
            Some(PlaygroundError::PythonException {
                exception_type,
                message,
                ..
            }) => {
                assert_eq!(exception_type, "StopIteration");
                assert!(message.is_empty());
            }
            other => panic!("expected PythonException, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_stderr() {
        assert!(parse_python_exception("").is_none());
        assert!(parse_python_exception("   ").is_none());
    }

    #[test]
    fn test_plain_output_is_not_an_exception() {
        assert!(parse_python_exception("hello world").is_none());
        assert!(parse_python_exception("done\nall good\n").is_none());
    }

    #[test]
    fn test_error_helpers() {
        let timeout = PlaygroundError::Timeout(std::time::Duration::from_secs(5));
        assert!(timeout.is_timeout());
        assert!(!timeout.is_memory_limit());
        assert!(!timeout.is_python_exception());

        let memory = PlaygroundError::MemoryLimitExceeded("test".to_string());
        assert!(memory.is_memory_limit());

        let exc = PlaygroundError::PythonException {
            exception_type: "ValueError".to_string(),
            message: "test".to_string(),
            traceback: None,
        };
        assert!(exc.is_python_exception());
        assert_eq!(exc.to_string(), "Python ValueError: test");
    }
}

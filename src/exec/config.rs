//! Playground configuration with builder pattern.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by all execution branches.
///
/// The timeout and memory limit apply to both language runtimes: the Python
/// interpreter enforces them through Wasmtime (epoch interruption plus a
/// store resource limiter), the JavaScript engine through its interrupt
/// handler and allocator limit.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// Maximum wall-clock time for one execution.
    pub timeout: Duration,
    /// Maximum memory in bytes for one execution.
    pub max_memory: u64,
    /// Maximum fuel (instruction count limit) for the Python interpreter.
    pub max_fuel: Option<u64>,
    /// Path to the RustPython wasm file.
    pub interpreter_path: PathBuf,
    /// Epoch interruption interval for cooperative timeout checks.
    pub epoch_tick_interval: Duration,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_memory: 64 * 1024 * 1024, // 64MB
            max_fuel: None,
            interpreter_path: PathBuf::from("assets/rustpython.wasm"),
            epoch_tick_interval: Duration::from_millis(10),
        }
    }
}

impl PlaygroundConfig {
    /// Create a new builder for PlaygroundConfig.
    pub fn builder() -> PlaygroundConfigBuilder {
        PlaygroundConfigBuilder::default()
    }

    /// The memory limit as a usize, for runtimes that take one.
    pub(crate) fn max_memory_usize(&self) -> usize {
        usize::try_from(self.max_memory).unwrap_or(usize::MAX)
    }
}

/// Builder for creating PlaygroundConfig instances.
#[derive(Debug, Clone, Default)]
pub struct PlaygroundConfigBuilder {
    timeout: Option<Duration>,
    max_memory: Option<u64>,
    max_fuel: Option<u64>,
    interpreter_path: Option<PathBuf>,
    epoch_tick_interval: Option<Duration>,
}

impl PlaygroundConfigBuilder {
    /// Set the maximum execution timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum memory limit in bytes.
    pub fn max_memory(mut self, bytes: u64) -> Self {
        self.max_memory = Some(bytes);
        self
    }

    /// Set the maximum fuel (instruction count) for Python executions.
    pub fn max_fuel(mut self, fuel: u64) -> Self {
        self.max_fuel = Some(fuel);
        self
    }

    /// Set the path to the RustPython wasm interpreter.
    pub fn interpreter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter_path = Some(path.into());
        self
    }

    /// Set the epoch tick interval for timeout checking.
    pub fn epoch_tick_interval(mut self, interval: Duration) -> Self {
        self.epoch_tick_interval = Some(interval);
        self
    }

    /// Build the PlaygroundConfig.
    pub fn build(self) -> PlaygroundConfig {
        let default = PlaygroundConfig::default();
        PlaygroundConfig {
            timeout: self.timeout.unwrap_or(default.timeout),
            max_memory: self.max_memory.unwrap_or(default.max_memory),
            max_fuel: self.max_fuel.or(default.max_fuel),
            interpreter_path: self.interpreter_path.unwrap_or(default.interpreter_path),
            epoch_tick_interval: self
                .epoch_tick_interval
                .unwrap_or(default.epoch_tick_interval),
        }
    }
}

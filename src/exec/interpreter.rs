//! The WASM Python interpreter session.
//!
//! A session owns a Wasmtime engine and the compiled RustPython module. It is
//! bootstrapped once (see [`crate::exec::session::SessionManager`]) and then
//! reused: each run instantiates a fresh store with its own WASI context, so
//! executions share the compiled interpreter but nothing else.

use std::time::Duration;

use wasmtime::{Engine, Linker, Module, Store, Trap};
use wasmtime_wasi::pipe::MemoryOutputPipe;
use wasmtime_wasi::preview1;
use wasmtime_wasi::{I32Exit, WasiCtxBuilder};

use crate::error::{PlaygroundError, Result};
use crate::exec::config::PlaygroundConfig;
use crate::exec::limits::{StoreData, StoreLimiterExt};

/// Cap on captured interpreter output, per stream.
const OUTPUT_PIPE_CAPACITY: usize = 1024 * 1024;

/// Number of epoch ticks a run may consume before its store traps.
///
/// The ticker advances the epoch once per `tick_interval`, so the deadline is
/// the timeout budget expressed in ticks, never less than one.
fn deadline_ticks(timeout: Duration, tick_interval: Duration) -> u64 {
    let interval_ms = tick_interval.as_millis().max(1);
    u64::try_from(timeout.as_millis() / interval_ms)
        .unwrap_or(u64::MAX)
        .max(1)
}

/// Classify a failed `_start` call.
///
/// An epoch-deadline trap means the run outlived its timeout budget; a WASI
/// exit carries the interpreter's exit code; anything else is a generic
/// execution fault.
fn classify_run_failure(
    e: wasmtime::Error,
    timeout: Duration,
) -> std::result::Result<i32, PlaygroundError> {
    if matches!(e.downcast_ref::<Trap>(), Some(Trap::Interrupt)) {
        return Err(PlaygroundError::Timeout(timeout));
    }
    match e.downcast_ref::<I32Exit>() {
        Some(exit) => Ok(exit.0),
        None => Err(PlaygroundError::ExecutionFault(e.to_string())),
    }
}

/// Raw outcome of one interpreter run.
#[derive(Debug, Clone)]
pub struct InterpreterOutcome {
    /// Captured stdout (interpreter-native redirection via the WASI context).
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Process exit code (0 for success).
    pub exit_code: i32,
}

impl InterpreterOutcome {
    /// Check if the run completed without an interpreter-level failure.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A live, reusable handle to the embedded Python interpreter.
pub struct InterpreterSession {
    config: PlaygroundConfig,
    engine: Engine,
    module: Module,
}

impl std::fmt::Debug for InterpreterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InterpreterSession {
    /// Load and compile the interpreter module.
    ///
    /// This is the heavyweight step the session manager performs exactly once
    /// per process lifetime. Compilation happens on a blocking thread.
    pub(crate) async fn bootstrap(config: PlaygroundConfig) -> Result<Self> {
        let mut engine_config = wasmtime::Config::new();
        engine_config.epoch_interruption(true);
        engine_config.consume_fuel(config.max_fuel.is_some());

        let engine = Engine::new(&engine_config).map_err(|e| {
            PlaygroundError::EnvironmentUnavailable(anyhow::anyhow!(
                "failed to create engine: {e}"
            ))
        })?;

        let path = config.interpreter_path.clone();
        let compile_engine = engine.clone();
        let module = tokio::task::spawn_blocking(move || -> Result<Module> {
            let wasm_bytes = std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PlaygroundError::InterpreterNotFound(path.display().to_string())
                } else {
                    PlaygroundError::Io(e)
                }
            })?;
            Module::new(&compile_engine, &wasm_bytes).map_err(|e| {
                PlaygroundError::EnvironmentUnavailable(anyhow::anyhow!(
                    "failed to compile interpreter module: {e}"
                ))
            })
        })
        .await
        .map_err(|e| {
            PlaygroundError::EnvironmentUnavailable(anyhow::anyhow!("bootstrap task failed: {e}"))
        })??;

        Ok(Self {
            config,
            engine,
            module,
        })
    }

    /// Execute Python code in the interpreter.
    ///
    /// Runs the interpreter on a blocking thread, raced against the
    /// configured timeout; an epoch ticker task makes a tight loop inside the
    /// interpreter observable to the deadline.
    pub async fn run(&self, code: &str) -> Result<InterpreterOutcome> {
        let code = code.to_string();
        let timeout = self.config.timeout;
        let epoch_interval = self.config.epoch_tick_interval;
        let max_memory = self.config.max_memory;
        let max_fuel = self.config.max_fuel;
        let engine = self.engine.clone();
        let module = self.module.clone();

        // The store's epoch deadline is the whole timeout budget expressed in
        // ticks, so the ticker can run from the start without tripping runs
        // that finish within the budget.
        let ticks = deadline_ticks(timeout, epoch_interval);

        let ticker_engine = engine.clone();
        let ticker_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(epoch_interval);
            loop {
                interval.tick().await;
                ticker_engine.increment_epoch();
            }
        });

        let exec_engine = engine.clone();
        let exec_handle = tokio::task::spawn_blocking(move || {
            Self::run_sync(&exec_engine, &module, &code, max_memory, max_fuel, timeout, ticks)
        });

        tokio::select! {
            result = exec_handle => {
                ticker_handle.abort();
                match result {
                    Ok(inner) => inner,
                    Err(e) => Err(PlaygroundError::ExecutionFault(format!("task panicked: {e}"))),
                }
            }
            _ = tokio::time::sleep(timeout) => {
                ticker_handle.abort();
                // Drive the epoch past the store deadline so the blocking run
                // traps out instead of leaking its thread
                for _ in 0..=ticks {
                    engine.increment_epoch();
                }
                Err(PlaygroundError::Timeout(timeout))
            }
        }
    }

    /// Synchronous execution (runs in a blocking task).
    #[allow(clippy::too_many_arguments)]
    fn run_sync(
        engine: &Engine,
        module: &Module,
        code: &str,
        max_memory: u64,
        max_fuel: Option<u64>,
        timeout: Duration,
        deadline_ticks: u64,
    ) -> Result<InterpreterOutcome> {
        let stdout = MemoryOutputPipe::new(OUTPUT_PIPE_CAPACITY);
        let stderr = MemoryOutputPipe::new(OUTPUT_PIPE_CAPACITY);

        // The code goes in via `-c`; stdout/stderr come back through
        // in-memory pipes owned by this run. No preopened directories, no
        // inherited environment, no network (WASI Preview 1 has no sockets).
        let wasi_ctx = WasiCtxBuilder::new()
            .args(&["python", "-c", code])
            .stdout(stdout.clone())
            .stderr(stderr.clone())
            .build_p1();

        let store_data = StoreData::new(max_memory, wasi_ctx);
        let mut store = Store::new(engine, store_data);
        store.configure_limiter();

        store.epoch_deadline_trap();
        store.set_epoch_deadline(deadline_ticks);

        if let Some(fuel) = max_fuel {
            store.set_fuel(fuel).map_err(|e| {
                PlaygroundError::ExecutionFault(format!("failed to set fuel: {e}"))
            })?;
        }

        let mut linker = Linker::new(engine);
        preview1::add_to_linker_sync(&mut linker, |data: &mut StoreData| &mut data.wasi).map_err(
            |e| {
                PlaygroundError::EnvironmentUnavailable(anyhow::anyhow!(
                    "failed to link WASI: {e}"
                ))
            },
        )?;

        let instance = linker.instantiate(&mut store, module).map_err(|e| {
            if store.data().limiter.limit_exceeded() {
                return PlaygroundError::MemoryLimitExceeded(
                    "memory limit exceeded during instantiation".to_string(),
                );
            }
            PlaygroundError::ExecutionFault(format!("failed to instantiate interpreter: {e}"))
        })?;

        let start = instance
            .get_typed_func::<(), ()>(&mut store, "_start")
            .map_err(|e| {
                PlaygroundError::ExecutionFault(format!("failed to get _start function: {e}"))
            })?;

        let exit_code = match start.call(&mut store, ()) {
            Ok(()) => 0,
            Err(e) => {
                if store.data().limiter.limit_exceeded() {
                    return Err(PlaygroundError::MemoryLimitExceeded(
                        "memory limit exceeded during execution".to_string(),
                    ));
                }
                classify_run_failure(e, timeout)?
            }
        };

        Ok(InterpreterOutcome {
            stdout: String::from_utf8_lossy(&stdout.contents()).into_owned(),
            stderr: String::from_utf8_lossy(&stderr.contents()).into_owned(),
            exit_code,
        })
    }
}

//! Single-flight session management for the Python interpreter.
//!
//! Bootstrapping the interpreter (reading and compiling the RustPython wasm)
//! is expensive, so it happens at most once per manager. Concurrent callers
//! racing the first bootstrap all await the same in-flight initialization; a
//! failed bootstrap is discarded rather than cached, so the next call retries
//! from scratch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, OnceCell};

use crate::error::Result;
use crate::exec::config::PlaygroundConfig;
use crate::exec::interpreter::InterpreterSession;

/// Owns the lazily-bootstrapped interpreter session and the run lock.
pub struct SessionManager {
    config: PlaygroundConfig,
    session: OnceCell<Arc<InterpreterSession>>,
    bootstraps: AtomicU64,
    run_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a manager; no interpreter work happens until the first call to
    /// [`session`](Self::session).
    pub fn new(config: PlaygroundConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
            bootstraps: AtomicU64::new(0),
            run_lock: Mutex::new(()),
        }
    }

    /// Return the session, bootstrapping it on first use.
    ///
    /// The cell serializes initialization: callers arriving while a bootstrap
    /// is in flight await its outcome instead of starting their own. On
    /// failure the cell stays empty and the error is returned to every
    /// waiter.
    pub async fn session(&self) -> Result<Arc<InterpreterSession>> {
        self.session
            .get_or_try_init(|| async {
                self.bootstraps.fetch_add(1, Ordering::SeqCst);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    path = %self.config.interpreter_path.display(),
                    "bootstrapping Python interpreter session"
                );
                let session = InterpreterSession::bootstrap(self.config.clone()).await?;
                Ok(Arc::new(session))
            })
            .await
            .map(Arc::clone)
    }

    /// Number of bootstrap attempts so far (successful or not).
    pub fn bootstrap_count(&self) -> u64 {
        self.bootstraps.load(Ordering::SeqCst)
    }

    /// True once a session has been successfully bootstrapped.
    pub fn is_ready(&self) -> bool {
        self.session.initialized()
    }

    /// Acquire the run lock.
    ///
    /// Python executions against the shared session are serialized through
    /// this guard so interleaved runs cannot corrupt each other's output.
    pub(crate) async fn run_guard(&self) -> MutexGuard<'_, ()> {
        self.run_lock.lock().await
    }
}

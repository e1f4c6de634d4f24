//! Resource limiting for the Python interpreter's Wasm store.

use wasmtime::{ResourceLimiter, Store};

/// Limiter that denies memory and table growth past the configured caps.
pub struct MemoryLimiter {
    max_memory: u64,
    current_memory: u64,
    max_table_elements: u64,
    limit_exceeded: bool,
}

impl MemoryLimiter {
    /// Create a limiter with the given memory cap in bytes.
    pub fn new(max_memory: u64) -> Self {
        Self {
            max_memory,
            current_memory: 0,
            max_table_elements: 10_000,
            limit_exceeded: false,
        }
    }

    /// True once any growth request has been denied.
    pub fn limit_exceeded(&self) -> bool {
        self.limit_exceeded
    }

    /// The last granted memory size.
    pub fn current_memory(&self) -> u64 {
        self.current_memory
    }
}

impl ResourceLimiter for MemoryLimiter {
    fn memory_growing(
        &mut self,
        _current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        let desired = desired as u64;
        if desired > self.max_memory {
            self.limit_exceeded = true;
            return Ok(false);
        }
        self.current_memory = desired;
        Ok(true)
    }

    fn table_growing(
        &mut self,
        _current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        if desired as u64 > self.max_table_elements {
            self.limit_exceeded = true;
            return Ok(false);
        }
        Ok(true)
    }
}

/// Per-run store data: the limiter plus the WASI context.
pub struct StoreData {
    /// The resource limiter.
    pub limiter: MemoryLimiter,
    /// WASI Preview 1 context for the interpreter.
    pub wasi: wasmtime_wasi::preview1::WasiP1Ctx,
}

impl StoreData {
    /// Create store data with the given memory cap and WASI context.
    pub fn new(max_memory: u64, wasi: wasmtime_wasi::preview1::WasiP1Ctx) -> Self {
        Self {
            limiter: MemoryLimiter::new(max_memory),
            wasi,
        }
    }
}

/// Extension trait wiring the limiter into a store.
pub trait StoreLimiterExt {
    /// Enable resource limiting on this store.
    fn configure_limiter(&mut self);
}

impl StoreLimiterExt for Store<StoreData> {
    fn configure_limiter(&mut self) {
        self.limiter(|data| &mut data.limiter);
    }
}

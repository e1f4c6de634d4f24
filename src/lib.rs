//! # Code Playground
//!
//! The execution core of a browser-style code playground.
//!
//! Given a source text and a language tag, this crate runs the code and
//! returns a uniform `{output, is_error}` result suitable for rendering in a
//! console-like view. Three execution branches are supported:
//!
//! - **JavaScript**: evaluated in a fresh QuickJS context per run, with the
//!   four console channels (log, error, warn, info) captured into a
//!   per-execution buffer. Nothing from the host application is visible to
//!   the evaluated program.
//! - **Python**: executed by a RustPython interpreter compiled to
//!   WebAssembly, running under Wasmtime with no filesystem or network
//!   access. The interpreter is bootstrapped once and reused across runs.
//! - **HTML**: parsed (never executed) with an HTML5 parser, producing a
//!   structural summary of the document body.
//!
//! ## Example
//!
//! ```rust,ignore
//! use code_playground_rs::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PlaygroundConfig::builder()
//!         .timeout(Duration::from_secs(5))
//!         .max_memory(32 * 1024 * 1024)  // 32MB
//!         .build();
//!
//!     let playground = Playground::new(config);
//!     let request = ExecutionRequest::new("console.log('hi')", Language::JavaScript);
//!     let result = playground.execute(request).await;
//!
//!     assert_eq!(result.output, "hi");
//!     assert!(!result.is_error);
//! }
//! ```
//!
//! ## Failure model
//!
//! [`Playground::execute`](exec::dispatcher::Playground::execute) never
//! returns an error: every failure (environment bootstrap, user exception,
//! timeout, memory limit, malformed markup) is folded into the result with
//! `is_error` set and a human-readable message. Both language runtimes are
//! bounded by a hard wall-clock timeout and a memory cap, so a runaway user
//! program cannot wedge the host.

pub mod error;
pub mod exec;
pub mod prelude;

// Re-export main types at crate root for convenience
pub use error::{PlaygroundError, Result};
pub use exec::capture::ConsoleCapture;
pub use exec::config::{PlaygroundConfig, PlaygroundConfigBuilder};
pub use exec::dispatcher::{ExecutionRequest, ExecutionResult, Language, Playground};
pub use exec::session::SessionManager;

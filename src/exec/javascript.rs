//! JavaScript execution branch backed by an embedded QuickJS engine.
//!
//! Every run gets a fresh `Runtime` and `Context`: the submitted program sees
//! only standard globals plus the console shim, and nothing survives from one
//! run to the next. The engine is bounded by a memory limit and a wall-clock
//! deadline checked from the interrupt handler.

use std::time::{Duration, Instant};

use rquickjs::function::Func;
use rquickjs::{CatchResultExt, Context, Runtime};

use crate::exec::capture::{Channel, ConsoleCapture};
use crate::exec::dispatcher::{ExecutionResult, NO_OUTPUT_MESSAGE};

/// Driver script evaluated in the fresh context.
///
/// It installs the console shim on top of the `__emit` host callback, then
/// runs the user source as the body of an anonymous function, mirroring a
/// top-level `new Function(source)()` evaluation: `return` is allowed at the
/// top level and the completion value is the function's return value. Thrown
/// errors are reported on the `exception` channel; engine interrupts are
/// uncatchable and propagate to the host.
const DRIVER: &str = r#"
(() => {
    const format = (value) => {
        if (typeof value === "object" && value !== null) {
            try {
                return JSON.stringify(value, null, 2);
            } catch (_) {
                return String(value);
            }
        }
        return String(value);
    };
    const join = (args, fmt) => args.map(fmt).join(" ");
    globalThis.console = {
        log: (...args) => __emit("log", join(args, format)),
        error: (...args) => __emit("error", join(args, String)),
        warn: (...args) => __emit("warn", join(args, String)),
        info: (...args) => __emit("info", join(args, String)),
    };
    try {
        const result = new Function(globalThis.__source)();
        if (result !== undefined) {
            __emit("return", format(result));
        }
    } catch (err) {
        const message = err instanceof Error ? err.message : String(err);
        __emit("exception", message);
    }
})();
"#;

enum EvalFailure {
    /// The interrupt handler fired (deadline passed).
    Interrupted,
    /// Engine-level failure outside the user program's try/catch.
    Engine(String),
}

/// Run one JavaScript program and fold the outcome into an [`ExecutionResult`].
///
/// Never panics and never returns an error: engine failures become error
/// results with a readable message.
pub(crate) fn run(source: &str, timeout: Duration, memory_limit: usize) -> ExecutionResult {
    let capture = ConsoleCapture::new();

    if let Err(failure) = eval_in_fresh_context(source, timeout, memory_limit, &capture) {
        return match failure {
            EvalFailure::Interrupted => {
                ExecutionResult::error(format!("Error: execution timed out after {timeout:?}"))
            }
            EvalFailure::Engine(message) => ExecutionResult::error(format!("Error: {message}")),
        };
    }

    match capture.render() {
        Some(output) => ExecutionResult {
            is_error: capture.has_errors(),
            output,
        },
        None => ExecutionResult::success(NO_OUTPUT_MESSAGE),
    }
}

fn eval_in_fresh_context(
    source: &str,
    timeout: Duration,
    memory_limit: usize,
    capture: &ConsoleCapture,
) -> Result<(), EvalFailure> {
    let engine_failure = |e: rquickjs::Error| EvalFailure::Engine(e.to_string());

    let runtime = Runtime::new().map_err(engine_failure)?;
    runtime.set_memory_limit(memory_limit);

    let deadline = Instant::now() + timeout;
    runtime.set_interrupt_handler(Some(Box::new(move || Instant::now() >= deadline)));

    let context = Context::full(&runtime).map_err(engine_failure)?;

    context.with(|ctx| {
        let sink = capture.clone();
        let emit = Func::from(move |channel: String, text: String| {
            sink.emit(Channel::from_tag(&channel), &text);
        });

        let globals = ctx.globals();
        globals.set("__emit", emit).map_err(engine_failure)?;
        globals.set("__source", source).map_err(engine_failure)?;

        match ctx.eval::<(), _>(DRIVER).catch(&ctx) {
            Ok(()) => Ok(()),
            Err(caught) => {
                let message = caught.to_string();
                if message.contains("interrupted") {
                    Err(EvalFailure::Interrupted)
                } else {
                    Err(EvalFailure::Engine(message))
                }
            }
        }
    })
}

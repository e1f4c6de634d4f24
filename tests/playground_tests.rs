//! End-to-end tests for the execution dispatcher.
//!
//! Python tests require rustpython.wasm at assets/rustpython.wasm and are
//! ignored by default; the JavaScript and HTML branches run everywhere.

use std::sync::Arc;
use std::time::Duration;

use code_playground_rs::prelude::*;

fn test_config() -> PlaygroundConfig {
    PlaygroundConfig::builder()
        .timeout(Duration::from_secs(5))
        .max_memory(32 * 1024 * 1024)
        .build()
}

fn playground() -> Playground {
    Playground::new(test_config())
}

async fn run(playground: &Playground, source: &str, language: Language) -> ExecutionResult {
    playground
        .execute(ExecutionRequest::new(source, language))
        .await
}

#[tokio::test]
async fn js_console_log_round_trip() {
    let pg = playground();
    let result = run(&pg, "console.log('hi')", Language::JavaScript).await;

    assert_eq!(result.output, "hi");
    assert!(!result.is_error);
}

#[tokio::test]
async fn js_thrown_error_is_classified() {
    let pg = playground();
    let result = run(&pg, "throw new Error('boom')", Language::JavaScript).await;

    assert!(result.is_error);
    assert!(result.output.contains("Execution Error: boom"));
}

#[tokio::test]
async fn js_empty_output_is_normalized() {
    let pg = playground();
    let result = run(&pg, "x = 1", Language::JavaScript).await;

    assert_eq!(result.output, "Code executed successfully (no output)");
    assert!(!result.is_error);
}

#[tokio::test]
async fn js_return_value_is_appended() {
    let pg = playground();
    let result = run(&pg, "return { a: 1 };", Language::JavaScript).await;

    assert!(result.output.starts_with("Returned:"));
    assert!(result.output.contains("\"a\": 1"));
    assert!(!result.is_error);
}

#[tokio::test]
async fn js_warn_info_fold_into_log_stream() {
    let pg = playground();
    let result = run(
        &pg,
        "console.warn('careful'); console.info('fyi'); console.log('done');",
        Language::JavaScript,
    )
    .await;

    assert_eq!(result.output, "WARNING: careful\nINFO: fyi\ndone");
    assert!(!result.is_error);
}

#[tokio::test]
async fn js_error_stream_concatenated_after_logs() {
    let pg = playground();
    let result = run(
        &pg,
        "console.log('a'); console.error('b'); console.log('c');",
        Language::JavaScript,
    )
    .await;

    assert_eq!(result.output, "a\nc\nERROR: b");
    assert!(result.is_error);
}

#[tokio::test]
async fn js_never_escapes_the_result_shape() {
    let pg = playground();
    for source in [
        "",
        "function {",
        "null.f()",
        "console.log(undefined)",
        "JSON.parse('{bad')",
        "const x = Symbol(); console.log(String(x));",
    ] {
        let result = run(&pg, source, Language::JavaScript).await;
        // A well-formed result either way; nothing panics
        assert!(!result.output.is_empty(), "source: {source}");
    }
}

#[tokio::test]
async fn js_runaway_loop_hits_wall_clock_deadline() {
    let pg = Playground::new(
        PlaygroundConfig::builder()
            .timeout(Duration::from_millis(200))
            .max_memory(32 * 1024 * 1024)
            .build(),
    );
    let result = run(&pg, "while (true) {}", Language::JavaScript).await;

    assert!(result.is_error);
    assert!(result.output.contains("timed out"));
}

#[tokio::test]
async fn js_runs_do_not_leak_into_each_other() {
    let pg = playground();
    let first = run(&pg, "console.log('first')", Language::JavaScript).await;
    assert_eq!(first.output, "first");

    // Nothing captured in the first run may surface in the second
    let second = run(&pg, "x = 1", Language::JavaScript).await;
    assert_eq!(second.output, "Code executed successfully (no output)");

    // Globals assigned by one run are invisible to the next
    let third = run(
        &pg,
        "console.log(typeof globalThis.x)",
        Language::JavaScript,
    )
    .await;
    assert_eq!(third.output, "undefined");
}

#[tokio::test]
async fn html_single_element_summary() {
    let pg = playground();
    let result = run(&pg, "<div>hi</div>", Language::Html).await;

    assert!(!result.is_error);
    assert!(result.output.contains("HTML structure detected:"));
    assert!(result.output.contains("- <div>"));
}

#[tokio::test]
async fn html_empty_source_reports_no_body() {
    let pg = playground();
    let result = run(&pg, "", Language::Html).await;

    assert_eq!(
        result.output,
        "HTML parsed successfully, but no body content detected."
    );
    assert!(!result.is_error);
}

#[tokio::test]
async fn unknown_language_is_a_soft_success() {
    let pg = playground();
    let result = run(&pg, "print('hi')", Language::parse("ruby")).await;

    assert_eq!(result.output, "Language not supported yet");
    assert!(!result.is_error);
}

#[tokio::test]
async fn python_missing_interpreter_reports_not_ready_and_retries() {
    let pg = Playground::new(
        PlaygroundConfig::builder()
            .interpreter_path("assets/definitely-missing.wasm")
            .build(),
    );

    let first = run(&pg, "print('hi')", Language::Python).await;
    assert!(first.is_error);
    assert!(first.output.contains("Python environment not ready"));
    assert_eq!(pg.sessions().bootstrap_count(), 1);

    // The failed bootstrap was not cached
    let second = run(&pg, "print('hi')", Language::Python).await;
    assert!(second.is_error);
    assert_eq!(pg.sessions().bootstrap_count(), 2);
}

#[tokio::test]
#[ignore = "requires rustpython.wasm"]
async fn python_print_round_trip() {
    let pg = playground();
    let result = run(&pg, "print('hello from python')", Language::Python).await;

    assert!(!result.is_error);
    assert_eq!(result.output.trim(), "hello from python");
}

#[tokio::test]
#[ignore = "requires rustpython.wasm"]
async fn python_empty_output_is_normalized() {
    let pg = playground();
    let result = run(&pg, "x = 1 + 1", Language::Python).await;

    assert!(!result.is_error);
    assert_eq!(result.output, "Code executed successfully (no output)");
}

#[tokio::test]
#[ignore = "requires rustpython.wasm"]
async fn python_exception_is_classified() {
    let pg = playground();
    let result = run(&pg, "raise ValueError('bad input')", Language::Python).await;

    assert!(result.is_error);
    assert!(result.output.contains("ValueError"));
    assert!(result.output.contains("bad input"));
}

#[tokio::test]
#[ignore = "requires rustpython.wasm"]
async fn python_session_is_reused_across_runs() {
    let pg = playground();

    let first = run(&pg, "print(1)", Language::Python).await;
    assert!(!first.is_error);
    let second = run(&pg, "print(2)", Language::Python).await;
    assert!(!second.is_error);

    assert_eq!(pg.sessions().bootstrap_count(), 1);
}

#[tokio::test]
#[ignore = "requires rustpython.wasm"]
async fn python_concurrent_requests_share_one_bootstrap() {
    let pg = Arc::new(playground());

    let mut handles = Vec::new();
    for i in 0..4 {
        let pg = Arc::clone(&pg);
        handles.push(tokio::spawn(async move {
            pg.execute(ExecutionRequest::new(
                format!("print({i})"),
                Language::Python,
            ))
            .await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(!result.is_error);
    }

    assert_eq!(pg.sessions().bootstrap_count(), 1);
}

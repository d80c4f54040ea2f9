//! Integration tests for the Python sandbox.
//!
//! Every test is skipped when no `python3` interpreter is available.

mod common;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use swiftsage::adapters::sandbox::PythonSandbox;
use swiftsage::domain::models::{AnswerMode, ExecStatus, SandboxResult};
use swiftsage::domain::ports::{CodeSandbox, SandboxError};
use swiftsage::services::normalize_answer;

const TIMEOUT: Duration = Duration::from_secs(5);

macro_rules! require_python {
    () => {
        if !common::python_available() {
            eprintln!("skipping: python3 not available");
            return;
        }
    };
}

async fn run(code: &str, mode: AnswerMode) -> SandboxResult {
    PythonSandbox::new("python3")
        .execute(code, TIMEOUT, &mode)
        .await
        .expect("sandbox machinery should not fail")
}

#[tokio::test]
async fn test_captures_stdout() {
    require_python!();
    let result = run("print('The answer is: 42')", AnswerMode::Stdout).await;
    assert_eq!(result, SandboxResult::done("The answer is: 42"));
    assert_eq!(normalize_answer(&result.value), "42");
}

#[tokio::test]
async fn test_exception_becomes_error_status() {
    require_python!();
    let result = run("x = 1\nprint(x / 0)", AnswerMode::Stdout).await;
    assert_eq!(result.status, ExecStatus::Error("division by zero".to_string()));
    assert!(result.value.is_empty());
}

#[tokio::test]
async fn test_exception_named_done_is_still_error() {
    require_python!();
    let result = run("raise ValueError('Done')", AnswerMode::Stdout).await;
    assert_eq!(result.status, ExecStatus::Error("Done".to_string()));
    assert!(!result.is_done());
}

#[tokio::test]
async fn test_system_exit_names_exception_type() {
    require_python!();
    let result = run("import sys\nprint(3)\nsys.exit(0)", AnswerMode::Stdout).await;
    assert_eq!(result.status, ExecStatus::Error("SystemExit: 0".to_string()));
    assert!(result.value.is_empty());
}

#[tokio::test]
async fn test_detached_grandchild_does_not_hold_pipes() {
    require_python!();
    let code = "import subprocess, sys\n\
                subprocess.Popen([sys.executable, '-c', 'import time; time.sleep(3)'], start_new_session=True)\n\
                print(5)";
    let started = Instant::now();
    let result = run(code, AnswerMode::Stdout).await;

    assert_eq!(result, SandboxResult::done("5"));
    assert!(
        started.elapsed() < Duration::from_millis(1500),
        "waited {:?} for a detached grandchild",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_infinite_loop_times_out() {
    require_python!();
    let sandbox = PythonSandbox::new("python3");
    let started = Instant::now();
    let result = sandbox
        .execute("while True:\n    pass", Duration::from_secs(2), &AnswerMode::Stdout)
        .await
        .unwrap();

    assert_eq!(result, SandboxResult::timeout());
    assert_eq!(result.status.report(), "Timeout Error");
    assert!(started.elapsed() < Duration::from_secs(6), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_output_before_timeout_is_discarded() {
    require_python!();
    let sandbox = PythonSandbox::new("python3");
    let result = sandbox
        .execute(
            "print('partial', flush=True)\nwhile True:\n    pass",
            Duration::from_secs(1),
            &AnswerMode::Stdout,
        )
        .await
        .unwrap();
    assert_eq!(result, SandboxResult::timeout());
}

#[tokio::test]
async fn test_symbol_mode() {
    require_python!();
    let result = run("answer = 6 * 7", AnswerMode::Symbol("answer".to_string())).await;
    assert_eq!(result, SandboxResult::done("42"));

    let missing = run("answer = 1", AnswerMode::Symbol("missing".to_string())).await;
    assert!(!missing.is_done());
}

#[tokio::test]
async fn test_expr_mode() {
    require_python!();
    let result = run("values = [3, 4, 5]", AnswerMode::Expr("sum(values)".to_string())).await;
    assert_eq!(result, SandboxResult::done("12"));
}

#[tokio::test]
async fn test_last_expression_mode() {
    require_python!();
    let result = run("x = 2\ny = 21\nx * y\n", AnswerMode::LastExpression).await;
    assert_eq!(result, SandboxResult::done("42"));
}

#[tokio::test]
async fn test_unserializable_answer_is_error() {
    require_python!();
    let result = run(
        "import threading\nlock = threading.Lock()",
        AnswerMode::Symbol("lock".to_string()),
    )
    .await;
    assert!(!result.is_done());
    assert!(result.status.report().contains("pickle"));
}

#[tokio::test]
async fn test_program_cannot_read_stdin() {
    require_python!();
    let result = run("line = input()\nprint(line)", AnswerMode::Stdout).await;
    assert!(!result.is_done());
}

#[tokio::test]
async fn test_headers_and_globals() {
    require_python!();
    let mut globals = BTreeMap::new();
    globals.insert("base".to_string(), serde_json::json!(2.5));
    let sandbox = PythonSandbox::new("python3")
        .with_headers(vec!["import math".to_string()])
        .with_globals(globals);

    let result = sandbox
        .execute("print(math.floor(base))", TIMEOUT, &AnswerMode::Stdout)
        .await
        .unwrap();
    assert_eq!(result, SandboxResult::done("2"));
}

#[tokio::test]
async fn test_runs_are_isolated() {
    require_python!();
    let sandbox = PythonSandbox::new("python3");
    sandbox
        .execute("leaked = 1", TIMEOUT, &AnswerMode::Stdout)
        .await
        .unwrap();
    let result = sandbox
        .execute("print(leaked)", TIMEOUT, &AnswerMode::Stdout)
        .await
        .unwrap();
    assert!(!result.is_done(), "globals must not survive between runs");
}

#[tokio::test]
async fn test_hard_exit_is_error() {
    require_python!();
    let result = run("import os\nos._exit(3)", AnswerMode::Stdout).await;
    assert!(!result.is_done());
    assert!(result.status.report().contains("without a result"));
}

#[tokio::test]
async fn test_hard_exit_keeps_program_stderr() {
    require_python!();
    let code = "import os, sys\nprint('boom', file=sys.stderr)\nos._exit(3)";
    let result = run(code, AnswerMode::Stdout).await;
    assert!(!result.is_done());
    assert!(result.status.report().ends_with("boom"));
}

#[tokio::test]
async fn test_missing_interpreter_is_machinery_error() {
    let sandbox = PythonSandbox::new("definitely-not-a-python-binary");
    let err = sandbox
        .execute("print(1)", TIMEOUT, &AnswerMode::Stdout)
        .await
        .unwrap_err();
    assert!(matches!(err, SandboxError::Spawn { .. }));
}

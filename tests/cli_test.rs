//! End-to-end tests for the `swiftsage` binary.

mod common;

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const SCRIPTED_CONFIG: &str = r#"
logging:
  level: warn
roles:
  swift:
    provider: scripted
    script:
      - "<plan>Multiply.</plan><code>print(6 * 7)</code>"
  feedback:
    provider: scripted
    script:
      - "<score>9</score><feedback>Correct.</feedback>"
  sage:
    provider: scripted
    script:
      - "<solved>True</solved>"
  choice:
    provider: scripted
    script:
      - "<choice>B</choice>"
"#;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file.flush().unwrap();
    file
}

fn swiftsage(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swiftsage"))
        .args(args)
        .env_remove("TOGETHER_API_KEY")
        .output()
        .expect("failed to run swiftsage binary")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[test]
fn test_config_show_redacts_keys() {
    let config = config_file("roles:\n  sage:\n    api_key: sk-very-secret\n");
    let path = config.path().to_str().unwrap();

    let output = swiftsage(&["--json", "--config", path, "config", "show"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["roles"]["sage"]["api_key"], "***");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("sk-very-secret"));
}

#[test]
fn test_invalid_config_fails() {
    let config = config_file("solver:\n  max_iterations: 0\n");
    let path = config.path().to_str().unwrap();

    let output = swiftsage(&["--json", "--config", path, "config", "show"]);
    assert!(!output.status.success());
    assert!(stdout_json(&output)["error"].is_string());
}

#[test]
fn test_solve_with_scripted_backends() {
    if !common::python_available() {
        eprintln!("skipping: python3 not available");
        return;
    }
    let config = config_file(SCRIPTED_CONFIG);
    let path = config.path().to_str().unwrap();
    let trace = NamedTempFile::new().unwrap();
    let trace_path = trace.path().to_str().unwrap();

    let output = swiftsage(&[
        "--json",
        "--config",
        path,
        "solve",
        "What is 6 * 7?",
        "--ground-truth",
        "42",
        "--trace-out",
        trace_path,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["solution"], "42");
    assert_eq!(json["termination"]["kind"], "accepted");
    assert_eq!(json["correct"], true);

    let raw = std::fs::read_to_string(trace.path()).unwrap();
    let written: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(written["trace"].as_object().unwrap().len(), 2);
    // steps are written in the order they happened
    let swift_at = raw.find("\"Swift 1\"").unwrap();
    let feedback_at = raw.find("\"Feedback 1\"").unwrap();
    assert!(swift_at < feedback_at);
    assert!(written["raw_trace"]["Swift 1"]["model_input"]
        .as_str()
        .unwrap()
        .contains("What is 6 * 7?"));
}

#[test]
fn test_exec_runs_file() {
    if !common::python_available() {
        eprintln!("skipping: python3 not available");
        return;
    }
    let mut program = NamedTempFile::new().unwrap();
    writeln!(program, "total = sum(range(10))").unwrap();
    program.flush().unwrap();
    let path = program.path().to_str().unwrap();

    let output = swiftsage(&["--json", "exec", path, "--mode", "symbol:total"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["value"], "45");
    assert_eq!(json["status"], "Done");
}

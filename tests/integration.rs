//! Integration tests for the `beeflang` binary

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

fn beeflang(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_beeflang"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start beeflang");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait on beeflang")
}

fn run_demo(name: &str) -> Output {
    let path = demo(name);
    beeflang(&[path.to_str().expect("utf-8 path")], "")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_add_program() {
    let output = run_demo("add.beef");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "5\n");
}

#[test]
fn test_counter_program() {
    let output = run_demo("counter.beef");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "3\n");
}

#[test]
fn test_factorial_program() {
    let output = run_demo("factorial.beef");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "1\n2\n6\n24\n120\n");
}

#[test]
fn test_program_reads_stdin() {
    let path = demo("greet.beef");
    let output = beeflang(&[path.to_str().expect("utf-8 path")], "Bessie\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "What is your name? Praise the Beef, Bessie!\n"
    );

    let output = beeflang(&[path.to_str().expect("utf-8 path")], "");
    assert_eq!(
        stdout(&output),
        "What is your name? Praise the Beef, stranger!\n"
    );
}

#[test]
fn test_missing_entry_point() {
    let output = run_demo("missing_entry.beef");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(
        stderr(&output).contains("Error: no ChurchOfBeef() entry point function found"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_syntax_errors() {
    let output = run_demo("syntax_error.beef");
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("Parser errors:\n"), "stderr: {}", err);
    assert!(
        err.contains("  line 1, column 15: expected next token to be IDENT, got : instead"),
        "stderr: {}",
        err
    );
    assert!(err.contains("line 5, column 5"), "stderr: {}", err);
}

#[test]
fn test_runtime_error() {
    let output = run_demo("runtime_error.beef");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "before\n");
    let err = stderr(&output);
    assert!(err.starts_with("Error at "), "stderr: {}", err);
    assert!(
        err.contains("runtime_error.beef:5:17 - type mismatch: INTEGER + BOOLEAN"),
        "stderr: {}",
        err
    );
}

#[test]
fn test_dump_tokens() {
    let path = demo("add.beef");
    let path = path.to_str().expect("utf-8 path");
    let output = beeflang(&["--dump-tokens", path], "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some(format!("Tokens for {}:", path).as_str()));
    assert_eq!(lines.next(), Some("---"));
    assert_eq!(
        lines.next(),
        Some(format!("{:<15} {:<10} (line 2, col 1)", "WRANGLE", "wrangle").as_str())
    );
    assert_eq!(
        out.lines().last(),
        Some(format!("{:<15} {:<10} (line 11, col 1)", "EOF", "").as_str())
    );
}

#[test]
fn test_dump_ast() {
    let path = demo("add.beef");
    let output = beeflang(&["--dump-ast", path.to_str().expect("utf-8 path")], "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["statements"].as_array().map(|s| s.len()), Some(3));
}

#[test]
fn test_unreadable_file() {
    let output = beeflang(&["/definitely/not/here.beef"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("failed to read"),
        "stderr: {}",
        stderr(&output)
    );
}

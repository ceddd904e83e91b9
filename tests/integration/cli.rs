//! Command-line tests against the built `quadvm` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const COUNTER: &str = r#"{"node": "program", "stmts": [
    {"node": "decl", "id": "c", "expr": {"node": "number", "value": 0}},
    {"node": "while",
     "cond": {"node": "binop", "op": "<",
              "left": {"node": "id", "name": "c"},
              "right": {"node": "number", "value": 3}},
     "body": [
        {"node": "print", "expr": {"node": "id", "name": "c"}},
        {"node": "assign", "id": "c",
         "expr": {"node": "binop", "op": "+",
                  "left": {"node": "id", "name": "c"},
                  "right": {"node": "number", "value": 1}}}
     ]}
]}"#;

fn quadvm(
    dir: &Path,
    args: &[&str],
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quadvm"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to spawn quadvm")
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("counter.json"), COUNTER).unwrap();
    dir
}

#[test]
fn test_cli_run() {
    let dir = workspace();
    let out = quadvm(dir.path(), &["run", "counter.json"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "0\n1\n2\n");
}

#[test]
fn test_cli_run_step_limit() {
    let dir = workspace();
    let out = quadvm(dir.path(), &["run", "counter.json", "--max-steps", "3"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("step limit of 3 exceeded"));
}

#[test]
fn test_cli_ir() {
    let dir = workspace();
    let out = quadvm(dir.path(), &["ir", "counter.json"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("(assign, 0, -, t0)"));
    assert!(stdout.contains("(label, L0, -, -)"));
    assert!(stdout.contains("(jfalse, t2, -, L1)"));
}

#[test]
fn test_cli_compile_prints_json() {
    let dir = workspace();
    let out = quadvm(dir.path(), &["compile", "counter.json"]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["execution"]["output"], "0\n1\n2\n");
}

#[test]
fn test_cli_missing_file_fails() {
    let dir = workspace();
    let out = quadvm(dir.path(), &["run", "nope.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.json"));
}

//! File-level entry points and configuration files

use quadvm::run_file;
use quadvm::util::config::{load_config, Config, CONFIG_FILE_NAME};
use quadvm::vm::{HaltReason, VMStatus};
use std::fs;
use tempfile::TempDir;

const FOREVER: &str = r#"{"node": "program", "stmts": [
    {"node": "print", "expr": {"node": "number", "value": 1}},
    {"node": "while", "cond": {"node": "bool", "value": true}, "body": []}
]}"#;

#[test]
fn test_run_file_reads_ast() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prog.json");
    fs::write(
        &path,
        r#"{"node": "program", "stmts": [
            {"node": "print", "expr": {"node": "binop", "op": "-",
                "left": {"node": "number", "value": 2},
                "right": {"node": "number", "value": 5}}}
        ]}"#,
    )
    .unwrap();

    let report = run_file(&path, &Config::default()).unwrap();
    assert_eq!(report.execution.output, "-3\n");
}

#[test]
fn test_run_file_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = run_file(&path, &Config::default()).unwrap_err();
    assert!(err.to_string().contains("Failed to read file"));
}

#[test]
fn test_config_file_sets_step_limit() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[vm]\nmax_steps = 20\n",
    )
    .unwrap();
    let program = dir.path().join("forever.json");
    fs::write(&program, FOREVER).unwrap();

    let config = load_config(None, dir.path()).unwrap();
    let report = run_file(&program, &config).unwrap();
    assert_eq!(report.execution.output, "1\n");
    assert_eq!(
        report.execution.status,
        VMStatus::Halted(HaltReason::StepLimitExceeded(20))
    );
    assert_eq!(report.execution.steps, 20);
}

#[test]
fn test_config_file_disables_optimization() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("custom.toml");
    fs::write(&config_path, "[pipeline]\noptimize = false\n").unwrap();
    let program = dir.path().join("prog.json");
    fs::write(
        &program,
        r#"{"node": "program", "stmts": [
            {"node": "decl", "id": "x", "expr": {"node": "number", "value": 1}},
            {"node": "assign", "id": "x", "expr": {"node": "id", "name": "x"}}
        ]}"#,
    )
    .unwrap();

    let config = load_config(Some(&config_path), dir.path()).unwrap();
    assert!(!config.pipeline.optimize);
    let report = run_file(&program, &config).unwrap();
    assert_eq!(report.metrics.quadruples_original, 3);
    assert_eq!(report.metrics.quadruples_optimized, 3);

    let report = run_file(&program, &Config::default()).unwrap();
    assert_eq!(report.metrics.quadruples_optimized, 2);
    assert_eq!(report.metrics.code_reduction, 33.33);
}

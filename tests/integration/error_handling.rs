//! Error handling integration tests
//!
//! Each failing phase is reported by name and later phases never run.

use quadvm::middle::{Label, OpCode, Operand, Quadruple};
use quadvm::pipeline::Phase;
use quadvm::util::config::Config;
use quadvm::vm::{execute, VMError};
use quadvm::{compile_json, run};

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = compile_json("{\"node\": \"program\", \"stmts\": [", &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Parse);
}

#[test]
fn test_unknown_statement_kind_fails_lowering() {
    let ast = r#"{"node": "program", "stmts": [{"node": "for", "body": []}]}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Intermediate);
    assert!(err.to_string().contains("`for`"));
}

#[test]
fn test_unknown_expression_kind_fails_lowering() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "assign", "id": "x", "expr": {"node": "string", "value": "hi"}}
    ]}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Intermediate);
    assert!(err.to_string().contains("`string`"));
}

#[test]
fn test_malformed_known_node_is_a_parse_error() {
    let ast = r#"{"node": "program", "stmts": [{"node": "print"}]}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Parse);
}

#[test]
fn test_root_must_be_program() {
    let ast = r#"{"node": "print", "expr": {"node": "number", "value": 1}}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Intermediate);
    assert!(err.to_string().contains("print"));
}

#[test]
fn test_statement_in_expression_position() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "print",
            "expr": {"node": "number", "value": 1}}}
    ]}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Intermediate);
    assert!(err.to_string().contains("`print`"));
}

#[test]
fn test_expression_in_statement_position() {
    let ast = r#"{"node": "program", "stmts": [{"node": "number", "value": 1}]}"#;
    let err = compile_json(ast, &Config::default()).unwrap_err();
    assert_eq!(err.phase(), Phase::Intermediate);
    assert!(err.to_string().contains("`number`"));
}

#[test]
fn test_unsupported_operator() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "binop", "op": "**",
            "left": {"node": "number", "value": 2},
            "right": {"node": "number", "value": 3}}}
    ]}"#;
    let err = run(ast).unwrap_err();
    assert!(format!("{:#}", err).contains("`**`"));
}

#[test]
fn test_malformed_quadruple_is_an_execution_error() {
    let quads = vec![
        Quadruple::print(Operand::int(1)),
        Quadruple::new(OpCode::Goto, None, None, Some(Operand::var("L0"))),
        Quadruple::label(Label(0)),
    ];
    match execute(&quads) {
        Err(VMError::MalformedQuadruple { pc, .. }) => assert_eq!(pc, 1),
        other => panic!("expected malformed quadruple, got {:?}", other),
    }
}

#[test]
fn test_unreached_malformed_quadruple_is_ignored() {
    let quads = vec![
        Quadruple::goto(Label(0)),
        Quadruple::new(OpCode::Print, None, None, None),
        Quadruple::label(Label(0)),
        Quadruple::print(Operand::int(3)),
    ];
    let result = execute(&quads).unwrap();
    assert_eq!(result.output, "3\n");
}

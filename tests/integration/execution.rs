//! End-to-end execution tests
//!
//! AST JSON in, program output out.

use quadvm::middle::{lower, optimize, OpCode};
use quadvm::util::config::Config;
use quadvm::vm::{execute, HaltReason, VMStatus};
use quadvm::{compile_json, run};

#[test]
fn test_print_literal() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "number", "value": 5}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "5\n");
}

#[test]
fn test_declare_assign_print() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "decl", "type": "int", "id": "x",
         "expr": {"node": "number", "value": 5}},
        {"node": "assign", "id": "x",
         "expr": {"node": "binop", "op": "+",
                  "left": {"node": "id", "name": "x"},
                  "right": {"node": "number", "value": 3}}},
        {"node": "print", "expr": {"node": "id", "name": "x"}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "8\n");
}

#[test]
fn test_if_else_takes_then_branch() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "if",
         "cond": {"node": "binop", "op": "<",
                  "left": {"node": "number", "value": 1},
                  "right": {"node": "number", "value": 2}},
         "then": [{"node": "print", "expr": {"node": "number", "value": 1}}],
         "otherwise": [{"node": "print", "expr": {"node": "number", "value": 0}}]}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "1\n");
}

#[test]
fn test_if_without_else_skips_body() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "if", "cond": {"node": "bool", "value": false},
         "then": [{"node": "print", "expr": {"node": "number", "value": 1}}]},
        {"node": "print", "expr": {"node": "number", "value": 2}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "2\n");
}

#[test]
fn test_while_counts_to_three() {
    let ast = r#"{"node": "program", "stmts": [
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
    let report = compile_json(ast, &Config::default()).unwrap();
    assert_eq!(report.execution.output, "0\n1\n2\n");
    assert_eq!(report.execution.status, VMStatus::Finished);
    assert_eq!(
        report.execution.variables.get("c"),
        Some(&quadvm::runtime::value::RuntimeValue::Int(3))
    );
}

#[test]
fn test_float_and_bool_printing() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "binop", "op": "/",
            "left": {"node": "fnumber", "value": 5.0},
            "right": {"node": "number", "value": 2}}},
        {"node": "print", "expr": {"node": "unop", "op": "!",
            "expr": {"node": "bool", "value": false}}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "2.5\ntrue\n");
}

#[test]
fn test_division_by_zero_prints_zero() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "binop", "op": "/",
            "left": {"node": "number", "value": 7},
            "right": {"node": "number", "value": 0}}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "0\n");
}

#[test]
fn test_unknown_variable_reads_as_zero() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "print", "expr": {"node": "id", "name": "ghost"}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "0\n");
}

#[test]
fn test_user_variable_named_like_a_temp() {
    let ast = r#"{"node": "program", "stmts": [
        {"node": "decl", "id": "t0", "expr": {"node": "number", "value": 9}},
        {"node": "print", "expr": {"node": "binop", "op": "+",
            "left": {"node": "number", "value": 1},
            "right": {"node": "id", "name": "t0"}}}
    ]}"#;
    assert_eq!(run(ast).unwrap(), "10\n");
}

#[test]
fn test_optimized_and_unoptimized_agree() {
    let ast = quadvm::frontend::Node::from_json(
        r#"{"node": "program", "stmts": [
            {"node": "decl", "id": "a", "expr": {"node": "number", "value": 4}},
            {"node": "while",
             "cond": {"node": "binop", "op": ">",
                      "left": {"node": "id", "name": "a"},
                      "right": {"node": "number", "value": 0}},
             "body": [
                {"node": "print", "expr": {"node": "binop", "op": "*",
                    "left": {"node": "id", "name": "a"},
                    "right": {"node": "id", "name": "a"}}},
                {"node": "assign", "id": "a",
                 "expr": {"node": "binop", "op": "-",
                          "left": {"node": "id", "name": "a"},
                          "right": {"node": "number", "value": 1}}}
             ]}
        ]}"#,
    )
    .unwrap();
    let quads = lower(&ast).unwrap();
    let optimized = optimize(&quads);
    let plain = execute(&quads).unwrap();
    let fast = execute(&optimized.sequence).unwrap();
    assert_eq!(plain.output, "16\n9\n4\n1\n");
    assert_eq!(plain.output, fast.output);
}

#[test]
fn test_hand_built_undefined_label_halts() {
    use quadvm::middle::{Label, Operand, Quadruple};

    let quads = vec![
        Quadruple::assign(Operand::int(1), Operand::var("x")),
        Quadruple::print(Operand::var("x")),
        Quadruple::goto(Label(7)),
        Quadruple::print(Operand::int(2)),
    ];
    assert_eq!(quads[2].op, OpCode::Goto);
    let result = execute(&quads).unwrap();
    assert_eq!(result.output, "1\n");
    assert_eq!(
        result.status,
        VMStatus::Halted(HaltReason::UndefinedLabel(Label(7)))
    );
}

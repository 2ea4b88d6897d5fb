//! Rule and philosophy documents end to end: execution, embedded unit
//! tests, self-validation, and self-proof.

use credo_logic_ast::{ErrorKind, Value};
use credo_logic_driver::{
    execute_philosophy, execute_philosophy_self_proof, execute_rule,
    execute_rule_self_validation, execute_rule_unit_tests, introspection_defaults,
};
use credo_logic_eval::{Engine, Environment};
use pretty_assertions::assert_eq;
use serde_json::json;

fn doc(json: serde_json::Value) -> Value {
    Value::from_json(&json)
}

fn rule_logic() -> serde_json::Value {
    // Every module name in the bound `modules` list is non-empty.
    json!({
        "quantifier": "forall",
        "variable": "m",
        "domain": {"var": "modules"},
        "condition": {"operator": "greater_than", "operands": [
            {"function": "length", "arguments": [{"var": "m"}]},
            0
        ]}
    })
}

fn rule_doc() -> Value {
    doc(json!({
        "rule": {
            "name": "no-nameless-modules",
            "logic": rule_logic(),
            "unit_tests": [
                {
                    "test_data": {"modules": ["ast", "eval"]},
                    "test_logic": rule_logic(),
                    "expected_result": true
                },
                {
                    "test_data": {"modules": [""]},
                    "test_logic": rule_logic(),
                    "expected_result": false
                }
            ],
            "self_validation": {
                "logic": {"operator": "and", "operands": [
                    {"function": "logic.is_well_formed", "arguments": [{"var": "rule_logic"}]},
                    {"function": "logic.all_functions_exist", "arguments": [{"var": "rule_logic"}]}
                ]}
            }
        }
    }))
}

fn philosophy_doc() -> Value {
    doc(json!({
        "philosophy": {
            "name": "structure-first",
            "formal_logic": {
                "conclusion": {
                    "logic": {"operator": "and", "operands": [
                        {"get_field": {"var": "file_organization"}, "key": "tests_colocated"},
                        {"get_field": {"var": "code_structure"}, "key": "modules_separated"}
                    ]}
                }
            },
            "self_proof": {
                "logic": {"function": "logic.is_well_formed", "arguments": [
                    {"get_field": {"get_field": {"var": "formal_logic"}, "key": "conclusion"},
                     "key": "logic"}
                ]}
            }
        }
    }))
}

#[test]
fn rule_logic_evaluates_against_host_bindings() {
    let mut engine = Engine::with_builtins();
    let mut env = Environment::new();
    env.bind(
        "modules",
        Value::List(vec![
            Value::String("ast".into()),
            Value::String("eval".into()),
        ]),
    );

    let result = execute_rule(&mut engine, &rule_doc(), &mut env).unwrap();
    assert_eq!(result, Value::Bool(true));
    // Introspection bindings are left behind for the host.
    assert!(env.has("rule"));
    assert!(env.has("rule_logic"));
}

#[test]
fn rule_logic_reports_violations() {
    let mut engine = Engine::with_builtins();
    let mut env = Environment::new();
    env.bind(
        "modules",
        Value::List(vec![Value::String("ast".into()), Value::String("".into())]),
    );
    let result = execute_rule(&mut engine, &rule_doc(), &mut env).unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn embedded_unit_tests_run_in_fresh_environments() {
    let mut engine = Engine::with_builtins();
    assert!(execute_rule_unit_tests(&mut engine, &rule_doc()).unwrap());
}

#[test]
fn first_expectation_mismatch_fails_the_suite() {
    let mut engine = Engine::with_builtins();
    let tampered = doc(json!({
        "rule": {
            "logic": rule_logic(),
            "unit_tests": [{
                "test_data": {"modules": ["ast"]},
                "test_logic": rule_logic(),
                "expected_result": false
            }]
        }
    }));
    assert!(!execute_rule_unit_tests(&mut engine, &tampered).unwrap());
}

#[test]
fn unit_test_errors_propagate_instead_of_failing_soft() {
    let mut engine = Engine::with_builtins();
    let broken = doc(json!({
        "rule": {
            "logic": rule_logic(),
            "unit_tests": [{
                // No test_data: the domain variable is unbound.
                "test_logic": rule_logic(),
                "expected_result": true
            }]
        }
    }));
    let err = execute_rule_unit_tests(&mut engine, &broken).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Name);
}

#[test]
fn self_validation_proves_the_rule_well_formed() {
    let mut engine = Engine::with_builtins();
    assert!(execute_rule_self_validation(&mut engine, &rule_doc()).unwrap());
}

#[test]
fn self_validation_rejects_a_broken_formula() {
    let mut engine = Engine::with_builtins();
    let broken = doc(json!({
        "rule": {
            "logic": {"operator": "frobnicate", "operands": []},
            "self_validation": {
                "logic": {"function": "logic.is_well_formed",
                          "arguments": [{"var": "rule_logic"}]}
            }
        }
    }));
    assert!(!execute_rule_self_validation(&mut engine, &broken).unwrap());
}

#[test]
fn philosophy_conclusion_uses_default_introspection() {
    let mut engine = Engine::with_builtins();
    let mut env = Environment::new();
    let result = execute_philosophy(&mut engine, &philosophy_doc(), &mut env).unwrap();
    assert_eq!(result, Value::Bool(true));
    assert!(env.has("philosophy"));
    assert!(env.has("formal_logic"));
}

#[test]
fn host_bindings_override_introspection_defaults() {
    let mut engine = Engine::with_builtins();
    let mut env = Environment::new();
    env.bind(
        "file_organization",
        doc(json!({"tests_colocated": false})),
    );
    let result = execute_philosophy(&mut engine, &philosophy_doc(), &mut env).unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn self_proof_inspects_its_own_conclusion() {
    let mut engine = Engine::with_builtins();
    assert!(execute_philosophy_self_proof(&mut engine, &philosophy_doc()).unwrap());
}

#[test]
fn defaults_cover_the_three_conventional_contexts() {
    let defaults = introspection_defaults();
    let names: Vec<&str> = defaults.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec!["file_organization", "code_structure", "code_quality"]
    );
    for (_, value) in defaults {
        let entries = value.as_map().unwrap().clone();
        assert_eq!(entries.len(), 3);
        assert!(entries.values().all(|flag| flag == &Value::Bool(true)));
    }
}

#[test]
fn boolean_entry_points_require_bool_results() {
    let mut engine = Engine::with_builtins();
    let numeric = doc(json!({
        "rule": {
            "logic": 1,
            "self_validation": {"logic": {"var": "rule_logic"}}
        }
    }));
    let err = execute_rule_self_validation(&mut engine, &numeric).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}
